use chrono::NaiveDate;

use crate::db::models::Session;
use crate::schedule::week_start_of;

/// What the edit panel currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Nothing,
    /// Unsaved session being prepared; not part of the working set yet.
    Draft(Session),
    /// A stored session, referenced by id.
    Existing(i64),
}

#[derive(Debug, Clone)]
pub struct PlannerState {
    pub week_start: NaiveDate,
    pub panel_width: f64,
    pub selection: Selection,
}

impl PlannerState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            week_start: week_start_of(today),
            panel_width: 0.0,
            selection: Selection::Nothing,
        }
    }

    pub fn show_week_of(&mut self, date: NaiveDate) {
        self.week_start = week_start_of(date);
    }

    /// Moves the displayed week by whole weeks.
    pub fn shift_weeks(&mut self, weeks: i64) {
        if let Some(moved) = self
            .week_start
            .checked_add_signed(chrono::Duration::weeks(weeks))
        {
            self.week_start = moved;
        }
    }

    pub fn set_panel_width(&mut self, width: f64) {
        self.panel_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }
}
