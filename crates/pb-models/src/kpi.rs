//! KPI target model and derived health
//!
//! `KpiSnapshot::derive` is the single source of truth for progress,
//! pace, and health. The original application duplicated this logic in
//! several places with slightly different thresholds; every consumer
//! here goes through this one function.

use chrono::{DateTime, NaiveDate, Utc};
use pb_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

use crate::priority::Priority;

/// Reporting period of a KPI target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KpiPeriod {
    Monthly,
    #[default]
    Quarterly,
    Yearly,
}

impl KpiPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiPeriod::Monthly => "monthly",
            KpiPeriod::Quarterly => "quarterly",
            KpiPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(KpiPeriod::Monthly),
            "quarterly" => Some(KpiPeriod::Quarterly),
            "yearly" => Some(KpiPeriod::Yearly),
            _ => None,
        }
    }
}

/// Record lifecycle of a KPI target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

impl KpiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiStatus::Active => "active",
            KpiStatus::Completed => "completed",
            KpiStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(KpiStatus::Active),
            "completed" => Some(KpiStatus::Completed),
            "archived" => Some(KpiStatus::Archived),
            _ => None,
        }
    }
}

/// A KPI target tracked against a deadline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KpiTarget {
    pub id: Option<Id>,
    pub title: String,
    pub department_id: Id,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: KpiPeriod,
    pub priority: Priority,
    pub status: KpiStatus,
    pub created_by: Id,
    #[serde(default)]
    pub assignee_ids: Vec<Id>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl KpiTarget {
    /// Derived progress/health as of the given day
    pub fn snapshot(&self, today: NaiveDate) -> KpiSnapshot {
        KpiSnapshot::derive(
            self.target_value,
            self.current_value,
            self.start_date,
            self.end_date,
            today,
        )
    }
}

impl Identifiable for KpiTarget {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for KpiTarget {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// A recorded progress value against a KPI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiProgress {
    pub id: Option<Id>,
    pub kpi_id: Id,
    pub value: f64,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Id,
}

/// A discussion comment on a KPI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComment {
    pub id: Option<Id>,
    pub kpi_id: Id,
    pub author_id: Id,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Tri-state health of a KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiHealth {
    Success,
    Warning,
    Danger,
}

impl KpiHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiHealth::Success => "success",
            KpiHealth::Warning => "warning",
            KpiHealth::Danger => "danger",
        }
    }
}

/// Derived progress figures for a KPI as of a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// Progress toward the target, clamped to [0, 100]
    pub progress_pct: f64,
    /// Elapsed share of the target window, clamped to [0, 100]
    pub elapsed_pct: f64,
    /// Days until the deadline; negative when overdue
    pub remaining_days: i64,
    /// Average recorded value per elapsed day
    pub velocity_per_day: f64,
    pub health: KpiHealth,
}

impl KpiSnapshot {
    /// Compute progress, pace, and health.
    ///
    /// A non-positive target yields 0% progress rather than a division
    /// error. A window of zero or negative length counts as fully
    /// elapsed. The function is total: any combination of inputs
    /// produces a snapshot.
    pub fn derive(
        target_value: f64,
        current_value: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let progress_pct = if target_value <= 0.0 {
            0.0
        } else {
            (current_value / target_value * 100.0).clamp(0.0, 100.0)
        };

        let total_days = (end_date - start_date).num_days();
        let elapsed_days = (today - start_date).num_days().clamp(0, total_days.max(0));
        let elapsed_pct = if total_days <= 0 {
            100.0
        } else {
            (elapsed_days as f64 / total_days as f64 * 100.0).clamp(0.0, 100.0)
        };

        let remaining_days = (end_date - today).num_days();
        let velocity_per_day = current_value / elapsed_days.max(1) as f64;

        let health = if progress_pct >= 100.0 {
            KpiHealth::Success
        } else if remaining_days < 0 {
            KpiHealth::Danger
        } else if progress_pct >= elapsed_pct {
            KpiHealth::Success
        } else if progress_pct < elapsed_pct / 2.0 {
            KpiHealth::Danger
        } else {
            KpiHealth::Warning
        };

        Self {
            progress_pct,
            elapsed_pct,
            remaining_days,
            velocity_per_day,
            health,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.remaining_days < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_behind_pace_mid_window() {
        // target=100, current=25, Jan 1..Jan 31, today Jan 16
        let snap = KpiSnapshot::derive(100.0, 25.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 16));

        assert_eq!(snap.progress_pct, 25.0);
        assert_eq!(snap.remaining_days, 15);
        assert_eq!(snap.elapsed_pct, 50.0);
        // Behind pace but not below half of elapsed
        assert_eq!(snap.health, KpiHealth::Warning);
    }

    #[test]
    fn test_progress_clamped() {
        let snap = KpiSnapshot::derive(100.0, 250.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 10));
        assert_eq!(snap.progress_pct, 100.0);
        assert_eq!(snap.health, KpiHealth::Success);

        let negative = KpiSnapshot::derive(100.0, -5.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 10));
        assert_eq!(negative.progress_pct, 0.0);
    }

    #[test]
    fn test_zero_target_is_zero_progress() {
        let snap = KpiSnapshot::derive(0.0, 50.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 10));
        assert_eq!(snap.progress_pct, 0.0);

        let negative_target =
            KpiSnapshot::derive(-10.0, 50.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 10));
        assert_eq!(negative_target.progress_pct, 0.0);
    }

    #[test]
    fn test_overdue_incomplete_is_danger() {
        let snap = KpiSnapshot::derive(100.0, 80.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 2, 5));
        assert!(snap.is_overdue());
        assert_eq!(snap.remaining_days, -5);
        assert_eq!(snap.health, KpiHealth::Danger);
    }

    #[test]
    fn test_overdue_but_complete_is_success() {
        let snap = KpiSnapshot::derive(100.0, 100.0, date(2024, 1, 1), date(2024, 1, 31), date(2024, 2, 5));
        assert_eq!(snap.health, KpiHealth::Success);
    }

    #[test]
    fn test_far_behind_pace_is_danger() {
        // 10% progress at 80% elapsed
        let snap = KpiSnapshot::derive(100.0, 10.0, date(2024, 1, 1), date(2024, 1, 11), date(2024, 1, 9));
        assert_eq!(snap.elapsed_pct, 80.0);
        assert_eq!(snap.health, KpiHealth::Danger);
    }

    #[test]
    fn test_on_pace_is_success() {
        let snap = KpiSnapshot::derive(100.0, 60.0, date(2024, 1, 1), date(2024, 1, 11), date(2024, 1, 6));
        assert_eq!(snap.elapsed_pct, 50.0);
        assert_eq!(snap.health, KpiHealth::Success);
    }

    #[test]
    fn test_zero_length_window() {
        let snap = KpiSnapshot::derive(100.0, 40.0, date(2024, 1, 15), date(2024, 1, 15), date(2024, 1, 15));
        assert_eq!(snap.elapsed_pct, 100.0);
        assert_eq!(snap.remaining_days, 0);
        // 40% at a fully elapsed window: behind pace but not overdue
        assert_eq!(snap.health, KpiHealth::Danger);
    }

    #[test]
    fn test_before_window_starts() {
        let snap = KpiSnapshot::derive(100.0, 0.0, date(2024, 2, 1), date(2024, 2, 28), date(2024, 1, 20));
        assert_eq!(snap.elapsed_pct, 0.0);
        assert_eq!(snap.health, KpiHealth::Success);
    }

    #[test]
    fn test_target_snapshot_delegates() {
        let kpi = KpiTarget {
            title: "Close 100 deals".into(),
            department_id: 1,
            target_value: 100.0,
            current_value: 25.0,
            unit: "deals".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            created_by: 1,
            ..Default::default()
        };
        let snap = kpi.snapshot(date(2024, 1, 16));
        assert_eq!(snap.progress_pct, 25.0);
        assert_eq!(snap.remaining_days, 15);
    }
}
