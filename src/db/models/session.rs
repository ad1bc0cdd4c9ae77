//! Training session model.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One scheduled activity. `id == 0` means it has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub activity: String,
    pub starts_at: NaiveDateTime,
    pub location: String,
    pub duration_minutes: u32,
    pub category_id: Option<i64>,
}

impl Session {
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// One-line summary used by agenda lists.
    pub fn description(&self) -> String {
        format!(
            "{} - {} @ {}",
            self.starts_at.format("%d/%m/%Y %H:%M"),
            self.activity,
            self.location
        )
    }
}

/// Field changes requested by the user. `None` leaves a field untouched;
/// `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct SessionEdit {
    pub activity: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub duration_minutes: Option<i64>,
    pub category_id: Option<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn description_and_end() {
        let session = Session {
            id: 0,
            activity: "Swimming".into(),
            starts_at: NaiveDate::from_ymd_opt(2025, 1, 8)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            location: "Pool".into(),
            duration_minutes: 45,
            category_id: None,
        };
        assert!(!session.is_persisted());
        assert_eq!(session.description(), "08/01/2025 18:00 - Swimming @ Pool");
        assert_eq!(session.ends_at().format("%H:%M").to_string(), "18:45");
    }
}
