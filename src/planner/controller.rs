use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use serde::Serialize;

use crate::{
    db::{Category, Database, Session, SessionEdit},
    schedule::{
        clamp_duration_to_midnight, compute_week_layout, day_index, in_week,
        validate_start_against_opening, validate_start_time, week_label, LayoutConfig,
        PositionedSession, ValidationOutcome, WeekDays,
    },
    settings::LayoutSettings,
};

use super::{PlannerState, Selection};

const DRAFT_ACTIVITY: &str = "New training session";
const DRAFT_LOCATION: &str = "Gymnasium";
const DRAFT_START_HOUR: u32 = 18;
const DRAFT_DURATION_MINUTES: u32 = 60;

/// Callbacks into the hosting UI.
pub trait PlannerView {
    fn session_added(&self, session: &Session);
    /// Returns `false` to cancel the deletion.
    fn confirm_delete(&self, session: &Session) -> bool;
    fn warn_past_midnight(&self, session: &Session);
    fn warn_before_opening(&self, session: &Session);
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EditOutcome {
    Applied,
    /// Accepted, but the duration was cut to end at midnight.
    Truncated { duration_minutes: u32 },
    /// Refused; the session keeps its previous values.
    Rejected(ValidationOutcome),
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Owns the in-memory working set and turns user actions into validated
/// replacements, store writes, and fresh layouts.
pub struct PlannerController {
    db: Database,
    view: Arc<dyn PlannerView>,
    settings: LayoutSettings,
    sessions: Vec<Session>,
    categories: Vec<Category>,
    state: PlannerState,
    clock: fn() -> NaiveDateTime,
}

impl PlannerController {
    pub async fn load(
        db: Database,
        view: Arc<dyn PlannerView>,
        settings: LayoutSettings,
    ) -> Result<Self> {
        let categories = db.get_categories().await?;
        let sessions = db.get_sessions().await?;
        info!(
            "Loaded {} sessions and {} categories",
            sessions.len(),
            categories.len()
        );

        Ok(Self {
            db,
            view,
            settings,
            sessions,
            categories,
            state: PlannerState::new(local_now().date()),
            clock: local_now,
        })
    }

    /// Replaces the wall clock and jumps to the week it reports.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self.state.show_week_of(self.today());
        self
    }

    /// Re-reads sessions and categories from the store.
    pub async fn reload(&mut self) -> Result<()> {
        self.categories = self.db.get_categories().await?;
        self.sessions = self.db.get_sessions().await?;
        if let Selection::Existing(id) = self.state.selection {
            if !self.sessions.iter().any(|s| s.id == id) {
                self.state.selection = Selection::Nothing;
            }
        }
        Ok(())
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date()
    }

    pub fn config(&self) -> LayoutConfig {
        self.settings.to_config(self.state.panel_width)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Agenda order: every stored session, earliest first.
    pub fn ordered_sessions(&self) -> Vec<&Session> {
        let mut ordered: Vec<&Session> = self.sessions.iter().collect();
        ordered.sort_by_key(|s| s.starts_at);
        ordered
    }

    // Week navigation

    pub fn week_start(&self) -> NaiveDate {
        self.state.week_start
    }

    pub fn week_label(&self) -> String {
        week_label(self.state.week_start)
    }

    pub fn day_dates(&self) -> Vec<NaiveDate> {
        WeekDays::new(self.state.week_start).collect()
    }

    /// Column to highlight, when today is in the displayed week.
    pub fn today_index(&self) -> Option<usize> {
        let now = self.today().and_time(NaiveTime::MIN);
        in_week(now, self.state.week_start).then(|| day_index(now))
    }

    pub fn previous_week(&mut self) {
        self.state.shift_weeks(-1);
    }

    pub fn next_week(&mut self) {
        self.state.shift_weeks(1);
    }

    pub fn go_to_today(&mut self) {
        let today = self.today();
        self.state.show_week_of(today);
    }

    pub fn show_week_of(&mut self, date: NaiveDate) {
        self.state.show_week_of(date);
    }

    /// Resize signal from the host.
    pub fn set_panel_width(&mut self, width: f64) {
        self.state.set_panel_width(width);
    }

    /// Geometry for the displayed week. Drafts are not drawn until committed.
    pub fn week_layout(&self) -> Vec<PositionedSession> {
        compute_week_layout(
            &self.sessions,
            &self.categories,
            self.state.week_start,
            &self.config(),
        )
    }

    // Selection

    pub fn selection(&self) -> Option<&Session> {
        match &self.state.selection {
            Selection::Nothing => None,
            Selection::Draft(draft) => Some(draft),
            Selection::Existing(id) => self.sessions.iter().find(|s| s.id == *id),
        }
    }

    pub fn select(&mut self, session_id: i64) -> Result<()> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            bail!("Session {session_id} not found");
        }
        self.state.selection = Selection::Existing(session_id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.state.selection = Selection::Nothing;
    }

    /// Starts a new unsaved session, replacing any current selection.
    pub fn new_draft(&mut self) -> Session {
        let today = self.today();
        let day = if in_week(today.and_time(NaiveTime::MIN), self.state.week_start) {
            today
        } else {
            self.state.week_start
        };
        let starts_at = day.and_time(
            NaiveTime::from_hms_opt(DRAFT_START_HOUR, 0, 0).unwrap_or(NaiveTime::MIN),
        );

        let draft = Session {
            id: 0,
            activity: DRAFT_ACTIVITY.into(),
            starts_at,
            location: DRAFT_LOCATION.into(),
            duration_minutes: DRAFT_DURATION_MINUTES,
            category_id: None,
        };
        self.state.selection = Selection::Draft(draft.clone());
        draft
    }

    /// Stores the draft and adds it to the working set.
    pub async fn commit_draft(&mut self) -> Result<Session> {
        let mut draft = match &self.state.selection {
            Selection::Draft(draft) => draft.clone(),
            _ => bail!("no draft session to commit"),
        };

        let clamp =
            clamp_duration_to_midnight(draft.starts_at, i64::from(draft.duration_minutes));
        draft.duration_minutes = clamp.duration_minutes;
        if clamp.was_clamped {
            warn!(
                "Draft '{}' cut to {} minutes to end by midnight",
                draft.activity, clamp.duration_minutes
            );
            self.view.warn_past_midnight(&draft);
        }

        draft.id = self.db.insert_session(&draft).await?;
        info!("Added session {} ({})", draft.id, draft.description());

        self.sessions.push(draft.clone());
        self.state.selection = Selection::Nothing;
        self.view.session_added(&draft);

        Ok(draft)
    }

    /// Applies user edits to the selection as one replacement.
    ///
    /// A start before the opening hour refuses the whole edit. A duration
    /// reaching past midnight is cut and reported.
    pub async fn edit_selected(&mut self, edit: SessionEdit) -> Result<EditOutcome> {
        let current = self
            .selection()
            .cloned()
            .ok_or_else(|| anyhow!("no session selected"))?;
        let mut candidate = current.clone();

        if let Some(activity) = edit.activity {
            candidate.activity = activity;
        }
        if let Some(location) = edit.location {
            candidate.location = location;
        }
        if let Some(category_id) = edit.category_id {
            if let Some(id) = category_id {
                if !self.categories.iter().any(|c| c.id == id) {
                    bail!("Category {id} not found");
                }
            }
            candidate.category_id = category_id;
        }

        if let Some(starts_at) = edit.starts_at {
            let outcome = validate_start_time(starts_at, self.settings.opening_hour);
            if !outcome.is_accepted() {
                warn!(
                    "Refused start {} for '{}': before opening hour {}",
                    starts_at, current.activity, self.settings.opening_hour
                );
                self.view.warn_before_opening(&current);
                return Ok(EditOutcome::Rejected(outcome));
            }
            candidate.starts_at = starts_at;
        }

        let requested = edit
            .duration_minutes
            .unwrap_or_else(|| i64::from(candidate.duration_minutes));
        let clamp = clamp_duration_to_midnight(candidate.starts_at, requested);
        candidate.duration_minutes = clamp.duration_minutes;

        self.replace_selected(candidate.clone()).await?;

        if clamp.was_clamped {
            warn!(
                "Session '{}' cut to {} minutes to end by midnight",
                candidate.activity, clamp.duration_minutes
            );
            self.view.warn_past_midnight(&candidate);
            Ok(EditOutcome::Truncated {
                duration_minutes: clamp.duration_minutes,
            })
        } else {
            Ok(EditOutcome::Applied)
        }
    }

    /// Moves the selection by whole hours. Moves that would leave the
    /// session's day window are refused, never truncated.
    pub async fn shift_selected(&mut self, delta_hours: i64) -> Result<ValidationOutcome> {
        let current = self
            .selection()
            .cloned()
            .ok_or_else(|| anyhow!("no session selected"))?;

        // A whole day or more always leaves the start day
        let new_start = if delta_hours.unsigned_abs() >= 24 {
            None
        } else {
            current
                .starts_at
                .checked_add_signed(Duration::hours(delta_hours))
        };

        let outcome = match new_start {
            Some(new_start) => validate_start_against_opening(
                current.starts_at.date(),
                new_start,
                current.duration_minutes,
                self.settings.opening_hour,
            ),
            None if delta_hours > 0 => ValidationOutcome::RejectedCrossesMidnight,
            None => ValidationOutcome::RejectedBeforeOpening,
        };

        match outcome {
            ValidationOutcome::Accepted => {
                if let Some(starts_at) = new_start {
                    self.replace_selected(Session { starts_at, ..current })
                        .await?;
                }
            }
            ValidationOutcome::RejectedCrossesMidnight => {
                warn!("Refused moving '{}' by {delta_hours}h: crosses midnight", current.activity);
                self.view.warn_past_midnight(&current);
            }
            ValidationOutcome::RejectedBeforeOpening => {
                warn!("Refused moving '{}' by {delta_hours}h: before opening", current.activity);
                self.view.warn_before_opening(&current);
            }
        }

        Ok(outcome)
    }

    /// Deletes the selection after the view confirms. Returns whether
    /// anything was removed.
    pub async fn delete_selected(&mut self) -> Result<bool> {
        let current = match self.selection() {
            Some(session) => session.clone(),
            None => return Ok(false),
        };

        if !self.view.confirm_delete(&current) {
            return Ok(false);
        }

        if current.is_persisted() {
            self.db.delete_session(current.id).await?;
            self.sessions.retain(|s| s.id != current.id);
            info!("Deleted session {}", current.id);
        }
        self.state.selection = Selection::Nothing;

        Ok(true)
    }

    async fn replace_selected(&mut self, candidate: Session) -> Result<()> {
        match self.state.selection {
            Selection::Nothing => bail!("no session selected"),
            Selection::Draft(_) => {
                self.state.selection = Selection::Draft(candidate);
            }
            Selection::Existing(id) => {
                self.db.update_session(&candidate).await?;
                let slot = self
                    .sessions
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| anyhow!("Session {id} missing from working set"))?;
                *slot = candidate;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Mutex};

    use super::*;

    #[derive(Default)]
    struct RecordingView {
        events: Mutex<Vec<String>>,
        refuse_delete: bool,
    }

    impl RecordingView {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PlannerView for RecordingView {
        fn session_added(&self, session: &Session) {
            self.record(format!("added {}", session.activity));
        }

        fn confirm_delete(&self, session: &Session) -> bool {
            self.record(format!("confirm {}", session.activity));
            !self.refuse_delete
        }

        fn warn_past_midnight(&self, session: &Session) {
            self.record(format!("midnight {}", session.activity));
        }

        fn warn_before_opening(&self, session: &Session) {
            self.record(format!("opening {}", session.activity));
        }
    }

    // Wednesday 2025-01-08, 09:00
    fn wednesday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 8)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    async fn planner(view: Arc<RecordingView>) -> PlannerController {
        let db = Database::new(PathBuf::from(":memory:")).unwrap();
        PlannerController::load(db, view, LayoutSettings::default())
            .await
            .unwrap()
            .with_clock(wednesday_morning)
    }

    async fn committed(planner: &mut PlannerController) -> Session {
        planner.new_draft();
        planner.commit_draft().await.unwrap()
    }

    #[tokio::test]
    async fn draft_is_drawn_only_after_commit() {
        let view = Arc::new(RecordingView::default());
        let mut planner = planner(view.clone()).await;

        let draft = planner.new_draft();
        assert_eq!(draft.starts_at, at(8, 18, 0));
        assert_eq!(draft.duration_minutes, 60);
        assert!(planner.week_layout().is_empty());

        let stored = planner.commit_draft().await.unwrap();
        assert!(stored.is_persisted());
        assert!(planner.selection().is_none());
        assert_eq!(view.events(), vec!["added New training session"]);

        let layout = planner.week_layout();
        assert_eq!(layout.len(), 1);
        assert_eq!((layout[0].x, layout[0].y), (190.0, 720.0));
        assert_eq!((layout[0].width, layout[0].height), (91.0, 56.0));
    }

    #[tokio::test]
    async fn draft_outside_current_week_starts_on_monday() {
        let mut planner = planner(Arc::new(RecordingView::default())).await;
        planner.next_week();
        assert_eq!(planner.new_draft().starts_at, at(13, 18, 0));
        assert!(planner.commit_draft().await.is_ok());
        assert!(planner.commit_draft().await.is_err());
    }

    #[tokio::test]
    async fn long_duration_is_cut_at_midnight() {
        let view = Arc::new(RecordingView::default());
        let mut planner = planner(view.clone()).await;
        let stored = committed(&mut planner).await;
        planner.select(stored.id).unwrap();

        let outcome = planner
            .edit_selected(SessionEdit {
                starts_at: Some(at(8, 23, 30)),
                duration_minutes: Some(90),
                ..SessionEdit::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome, EditOutcome::Truncated { duration_minutes: 30 });
        assert_eq!(planner.selection().unwrap().duration_minutes, 30);
        assert!(view.events().contains(&"midnight New training session".to_string()));

        planner.reload().await.unwrap();
        assert_eq!(planner.sessions()[0].duration_minutes, 30);
        assert_eq!(planner.sessions()[0].starts_at, at(8, 23, 30));
    }

    #[tokio::test]
    async fn start_before_opening_keeps_previous_values() {
        let view = Arc::new(RecordingView::default());
        let mut planner = planner(view.clone()).await;
        let stored = committed(&mut planner).await;
        planner.select(stored.id).unwrap();

        let outcome = planner
            .edit_selected(SessionEdit {
                activity: Some("Dawn run".into()),
                starts_at: Some(at(8, 5, 0)),
                ..SessionEdit::default()
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            EditOutcome::Rejected(ValidationOutcome::RejectedBeforeOpening)
        );
        assert_eq!(planner.selection().unwrap(), &stored);
        assert!(view.events().contains(&"opening New training session".to_string()));
    }

    #[tokio::test]
    async fn shift_past_midnight_is_refused_not_truncated() {
        let view = Arc::new(RecordingView::default());
        let mut planner = planner(view.clone()).await;
        planner.new_draft();
        planner
            .edit_selected(SessionEdit {
                starts_at: Some(at(8, 23, 0)),
                ..SessionEdit::default()
            })
            .await
            .unwrap();

        let outcome = planner.shift_selected(1).await.unwrap();
        assert_eq!(outcome, ValidationOutcome::RejectedCrossesMidnight);
        let draft = planner.selection().unwrap();
        assert_eq!(draft.starts_at, at(8, 23, 0));
        assert_eq!(draft.duration_minutes, 60);

        let earlier = planner.shift_selected(-1).await.unwrap();
        assert_eq!(earlier, ValidationOutcome::Accepted);
        assert_eq!(planner.selection().unwrap().starts_at, at(8, 22, 0));
    }

    #[tokio::test]
    async fn shift_before_opening_is_refused() {
        let mut planner = planner(Arc::new(RecordingView::default())).await;
        let stored = committed(&mut planner).await;
        planner.select(stored.id).unwrap();
        planner
            .edit_selected(SessionEdit {
                starts_at: Some(at(8, 6, 30)),
                ..SessionEdit::default()
            })
            .await
            .unwrap();

        let outcome = planner.shift_selected(-1).await.unwrap();
        assert_eq!(outcome, ValidationOutcome::RejectedBeforeOpening);
        assert_eq!(planner.selection().unwrap().starts_at, at(8, 6, 30));

        assert_eq!(planner.shift_selected(1).await.unwrap(), ValidationOutcome::Accepted);
        planner.reload().await.unwrap();
        assert_eq!(planner.sessions()[0].starts_at, at(8, 7, 30));
    }

    #[tokio::test]
    async fn extreme_shifts_are_refused() {
        let view = Arc::new(RecordingView::default());
        let mut planner = planner(view.clone()).await;
        let draft = planner.new_draft();

        assert_eq!(
            planner.shift_selected(i64::MIN).await.unwrap(),
            ValidationOutcome::RejectedBeforeOpening
        );
        assert_eq!(
            planner.shift_selected(i64::MAX).await.unwrap(),
            ValidationOutcome::RejectedCrossesMidnight
        );
        assert_eq!(
            planner.shift_selected(-24).await.unwrap(),
            ValidationOutcome::RejectedBeforeOpening
        );
        assert_eq!(planner.selection().unwrap(), &draft);
        assert_eq!(
            view.events(),
            vec![
                "opening New training session",
                "midnight New training session",
                "opening New training session",
            ]
        );
    }

    #[tokio::test]
    async fn delete_asks_first() {
        let view = Arc::new(RecordingView {
            refuse_delete: true,
            ..RecordingView::default()
        });
        let mut planner = planner(view.clone()).await;
        let stored = committed(&mut planner).await;
        planner.select(stored.id).unwrap();

        assert!(!planner.delete_selected().await.unwrap());
        assert_eq!(planner.sessions().len(), 1);

        let confirming: Arc<dyn PlannerView> = Arc::new(RecordingView::default());
        planner.view = confirming;
        assert!(planner.delete_selected().await.unwrap());
        assert!(planner.sessions().is_empty());
        assert!(planner.selection().is_none());
        planner.reload().await.unwrap();
        assert!(planner.sessions().is_empty());
        assert!(!planner.delete_selected().await.unwrap());
    }

    #[tokio::test]
    async fn category_edits_check_reference_data() {
        let mut planner = planner(Arc::new(RecordingView::default())).await;
        let stored = committed(&mut planner).await;
        planner.select(stored.id).unwrap();

        let unknown = planner
            .edit_selected(SessionEdit {
                category_id: Some(Some(99)),
                ..SessionEdit::default()
            })
            .await;
        assert!(unknown.is_err());

        planner
            .edit_selected(SessionEdit {
                category_id: Some(Some(3)),
                ..SessionEdit::default()
            })
            .await
            .unwrap();
        assert_eq!(planner.week_layout()[0].color, "#9B59B6");

        planner
            .edit_selected(SessionEdit {
                category_id: Some(None),
                ..SessionEdit::default()
            })
            .await
            .unwrap();
        assert_eq!(planner.week_layout()[0].category_label, "Uncategorized");
        assert_eq!(planner.categories().len(), 5);
    }

    #[tokio::test]
    async fn week_navigation_and_today_marker() {
        let mut planner = planner(Arc::new(RecordingView::default())).await;
        assert_eq!(planner.week_label(), "Week of 06/01/2025 to 12/01/2025");
        assert_eq!(planner.today_index(), Some(2));
        assert_eq!(planner.day_dates()[6], NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());

        planner.previous_week();
        assert_eq!(planner.today_index(), None);
        assert_eq!(planner.week_start(), NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());

        planner.go_to_today();
        assert_eq!(planner.week_start(), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());

        planner.show_week_of(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(planner.week_start(), NaiveDate::from_ymd_opt(2025, 2, 24).unwrap());
    }

    #[tokio::test]
    async fn resize_recomputes_widths() {
        let mut planner = planner(Arc::new(RecordingView::default())).await;
        committed(&mut planner).await;
        committed(&mut planner).await;

        planner.set_panel_width(700.0);
        let layout = planner.week_layout();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].width, 46.0);
        assert_eq!(layout[1].x, 250.0);

        let ordered = planner.ordered_sessions();
        assert!(ordered[0].starts_at <= ordered[1].starts_at);
    }
}
