//! Logged work activities and their categories

use chrono::{NaiveDate, NaiveTime};
use pb_core::traits::{Id, Identifiable};
use pb_core::types::Color;
use serde::{Deserialize, Serialize};

/// A logged block of work time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<Id>,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Duration in minutes, stored denormalized for reporting
    pub duration_minutes: i32,
    pub category_id: Id,
    pub user_id: Id,
}

impl Activity {
    /// Minutes between start and end; the stored duration should agree
    pub fn computed_duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

impl Identifiable for Activity {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

/// A calendar/reporting category for activities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCategory {
    pub id: Option<Id>,
    pub name: String,
    pub color: Color,
}

impl ActivityCategory {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            id: None,
            name: name.into(),
            color,
        }
    }
}

impl Identifiable for ActivityCategory {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_duration() {
        let activity = Activity {
            id: None,
            title: "Sprint planning".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            duration_minutes: 90,
            category_id: 1,
            user_id: 1,
        };
        assert_eq!(activity.computed_duration_minutes(), 90);
    }
}
