use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

/// Exclusive upper bound of the week starting at `week_start`.
pub fn week_end(week_start: NaiveDate) -> NaiveDateTime {
    week_start
        .checked_add_days(Days::new(7))
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
}

/// Half-open membership test `[week_start, week_start + 7 days)`.
pub fn in_week(starts_at: NaiveDateTime, week_start: NaiveDate) -> bool {
    starts_at >= week_start.and_time(NaiveTime::MIN) && starts_at < week_end(week_start)
}

/// Grid column of a start time, Monday = 0 through Sunday = 6.
pub fn day_index(starts_at: NaiveDateTime) -> usize {
    ((starts_at.weekday().number_from_monday() + 6) % 7) as usize
}

/// Header text for the displayed week.
pub fn week_label(week_start: NaiveDate) -> String {
    let sunday = week_start
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);
    format!(
        "Week of {} to {}",
        week_start.format("%d/%m/%Y"),
        sunday.format("%d/%m/%Y")
    )
}

/// The seven calendar dates of a week, Monday first.
pub struct WeekDays {
    next: Option<NaiveDate>,
    remaining: u8,
}

impl WeekDays {
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            next: Some(week_start),
            remaining: 7,
        }
    }
}

impl Iterator for WeekDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.succ_opt();
        Some(current)
    }
}
