//! # pb-reports
//!
//! Aggregation and reporting for Pulseboard dashboards: single-pass
//! grouped sums and counts, percentage breakdowns, and CSV export.

pub mod aggregation;
pub mod export;
pub mod reports;

pub use aggregation::{count_by, sum_by, Breakdown, BreakdownRow};
pub use export::{breakdown_to_csv, ExportError};
