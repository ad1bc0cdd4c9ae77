//! Temporal rules for a session's start and duration.
//!
//! A session lives inside `[opening_hour:00, 24:00)` of its start day. Direct
//! duration edits are truncated to fit and flagged; moves that would leave the
//! window are refused outright.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Result of fitting a duration before midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampOutcome {
    pub duration_minutes: u32,
    pub was_clamped: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationOutcome {
    Accepted,
    RejectedBeforeOpening,
    RejectedCrossesMidnight,
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

/// Whole minutes left between `starts_at` and the following midnight.
pub fn minutes_until_midnight(starts_at: NaiveDateTime) -> u32 {
    let elapsed = starts_at.time().num_seconds_from_midnight();
    SECONDS_PER_DAY.saturating_sub(elapsed) / 60
}

/// Truncates `duration_minutes` so the session ends by midnight of its start
/// day. Negative input is treated as zero and is not reported as clamped.
pub fn clamp_duration_to_midnight(starts_at: NaiveDateTime, duration_minutes: i64) -> ClampOutcome {
    let requested = duration_minutes.max(0);
    let max_minutes = minutes_until_midnight(starts_at);

    if requested > i64::from(max_minutes) {
        ClampOutcome {
            duration_minutes: max_minutes,
            was_clamped: true,
        }
    } else {
        ClampOutcome {
            // requested <= max_minutes <= 1440 here
            duration_minutes: requested as u32,
            was_clamped: false,
        }
    }
}

/// Checks a directly edited start time. Only the opening hour applies: the
/// duration is clamped afterwards instead of refusing the edit.
pub fn validate_start_time(new_start: NaiveDateTime, opening_hour: u32) -> ValidationOutcome {
    if new_start.hour() < opening_hour {
        ValidationOutcome::RejectedBeforeOpening
    } else {
        ValidationOutcome::Accepted
    }
}

/// Checks a candidate start produced by moving a session that belongs to
/// `intended_day`, keeping its current duration.
///
/// Landing on the next day is reported as a midnight crossing even though the
/// new time is also before opening; landing on an earlier day means the
/// session left the window through the opening hour.
pub fn validate_start_against_opening(
    intended_day: NaiveDate,
    new_start: NaiveDateTime,
    duration_minutes: u32,
    opening_hour: u32,
) -> ValidationOutcome {
    let landed_on = new_start.date();
    if landed_on > intended_day {
        return ValidationOutcome::RejectedCrossesMidnight;
    }
    if landed_on < intended_day {
        return ValidationOutcome::RejectedBeforeOpening;
    }

    if new_start.hour() < opening_hour {
        return ValidationOutcome::RejectedBeforeOpening;
    }

    if duration_minutes > minutes_until_midnight(new_start) {
        return ValidationOutcome::RejectedCrossesMidnight;
    }

    ValidationOutcome::Accepted
}
