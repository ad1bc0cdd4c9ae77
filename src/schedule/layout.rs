use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::db::models::{Category, Session};
use crate::{log_debug, log_info};
use crate::schedule::{
    collisions::{collision_slot, CollisionSlot},
    config::{LayoutConfig, SLOT_MARGIN_PX},
    week::{day_index, in_week, week_start_of},
};

const ENABLE_LOGS: bool = false;

/// A session with its on-screen block inside the weekly grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedSession {
    pub session: Session,
    pub day_index: usize,
    pub column_index: usize,
    pub column_count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub category_label: String,
}

impl PositionedSession {
    pub fn activity(&self) -> &str {
        &self.session.activity
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.session.starts_at
    }

    pub fn duration_minutes(&self) -> u32 {
        self.session.duration_minutes
    }

    pub fn location(&self) -> &str {
        &self.session.location
    }
}

/// Lays out every session starting inside the week of `week_start`.
///
/// Pure projection: the result is rebuilt from scratch on each call and
/// sessions outside the week are skipped.
pub fn compute_week_layout(
    sessions: &[Session],
    categories: &[Category],
    week_start: NaiveDate,
    config: &LayoutConfig,
) -> Vec<PositionedSession> {
    let week_start = week_start_of(week_start);

    // Step 1: keep the week, stable on start time so ties keep input order
    let mut visible: Vec<&Session> = sessions
        .iter()
        .filter(|s| in_week(s.starts_at, week_start))
        .collect();
    visible.sort_by_key(|s| s.starts_at);

    // Step 2: bucket by weekday; days never interact
    let mut days: [Vec<&Session>; 7] = Default::default();
    for session in visible {
        days[day_index(session.starts_at)].push(session);
    }

    // Steps 3-5: local collision slot, then pixels
    let mut positioned = Vec::new();
    for (index, day) in days.iter().enumerate() {
        for position in 0..day.len() {
            let slot = collision_slot(day, position);
            if slot.column_count > 1 {
                log_debug!(
                    "Session {} shares day {index} with {} others",
                    day[position].id,
                    slot.column_count - 1
                );
            }
            positioned.push(place(day[position], index, slot, categories, config));
        }
    }

    log_info!(
        "Laid out {} sessions for week of {}",
        positioned.len(),
        week_start
    );

    positioned
}

fn place(
    session: &Session,
    day_index: usize,
    slot: CollisionSlot,
    categories: &[Category],
    config: &LayoutConfig,
) -> PositionedSession {
    let day_width = config.day_column_width();
    // column_count >= 1 because a session always collides with itself
    let column_width = day_width / slot.column_count as f64;

    let time = session.starts_at.time();
    let decimal_hour = f64::from(time.hour()) + f64::from(time.minute()) / 60.0;
    let y = ((decimal_hour - f64::from(config.opening_hour)) * config.pixels_per_hour).max(0.0);
    let height =
        f64::from(session.duration_minutes) / 60.0 * config.pixels_per_hour - SLOT_MARGIN_PX;

    let category = session
        .category_id
        .and_then(|id| categories.iter().find(|category| category.id == id));

    PositionedSession {
        session: session.clone(),
        day_index,
        column_index: slot.column_index,
        column_count: slot.column_count,
        x: day_index as f64 * day_width + slot.column_index as f64 * column_width,
        y,
        width: column_width - SLOT_MARGIN_PX,
        height,
        color: Category::color_or_default(category).to_string(),
        category_label: Category::label_or_default(category).to_string(),
    }
}
