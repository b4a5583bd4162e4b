//! Grouped sums, counts, and percentage breakdowns
//!
//! Single-pass transformations over collections already in memory.
//! Keys are kept in a `BTreeMap` so report rows come out in a stable
//! order.

use serde::Serialize;
use std::collections::BTreeMap;

/// Group items by a key and sum a weight per group
pub fn sum_by<T, K, FK, FW>(items: &[T], key_fn: FK, weight_fn: FW) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FW: Fn(&T) -> f64,
{
    let mut sums = BTreeMap::new();
    for item in items {
        *sums.entry(key_fn(item)).or_insert(0.0) += weight_fn(item);
    }
    sums
}

/// Group items by a key and count per group
pub fn count_by<T, K, FK>(items: &[T], key_fn: FK) -> BTreeMap<K, u64>
where
    K: Ord,
    FK: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key_fn(item)).or_insert(0u64) += 1;
    }
    counts
}

/// One row of a percentage breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub key: String,
    pub total: f64,
    /// Share of the grand total, rounded to one decimal for display
    pub percentage: f64,
}

/// A grouped total with percentage-of-total per row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub rows: Vec<BreakdownRow>,
    pub grand_total: f64,
}

impl Breakdown {
    /// Build from grouped sums. An empty input yields an empty breakdown;
    /// a zero grand total yields 0% rows rather than dividing by zero.
    pub fn from_sums<K: Ord + ToString>(sums: BTreeMap<K, f64>) -> Self {
        let grand_total: f64 = sums.values().sum();

        let rows = sums
            .into_iter()
            .map(|(key, total)| {
                let percentage = if grand_total == 0.0 {
                    0.0
                } else {
                    round1(total / grand_total * 100.0)
                };
                BreakdownRow {
                    key: key.to_string(),
                    total,
                    percentage,
                }
            })
            .collect();

        Self { rows, grand_total }
    }

    /// Build from grouped counts
    pub fn from_counts<K: Ord + ToString>(counts: BTreeMap<K, u64>) -> Self {
        Self::from_sums(counts.into_iter().map(|(k, v)| (k, v as f64)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Display rounding to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ActivityLike {
        category: &'static str,
        duration: f64,
    }

    fn sample() -> Vec<ActivityLike> {
        vec![
            ActivityLike { category: "meeting", duration: 60.0 },
            ActivityLike { category: "meeting", duration: 30.0 },
            ActivityLike { category: "project", duration: 90.0 },
        ]
    }

    #[test]
    fn test_sum_by_category() {
        let sums = sum_by(&sample(), |a| a.category, |a| a.duration);

        assert_eq!(sums.get("meeting"), Some(&90.0));
        assert_eq!(sums.get("project"), Some(&90.0));
    }

    #[test]
    fn test_breakdown_percentages() {
        let breakdown = Breakdown::from_sums(sum_by(&sample(), |a| a.category, |a| a.duration));

        assert_eq!(breakdown.grand_total, 180.0);
        assert_eq!(breakdown.row("meeting").unwrap().percentage, 50.0);
        assert_eq!(breakdown.row("project").unwrap().percentage, 50.0);
    }

    #[test]
    fn test_count_by() {
        let counts = count_by(&sample(), |a| a.category);
        assert_eq!(counts.get("meeting"), Some(&2));
        assert_eq!(counts.get("project"), Some(&1));
    }

    #[test]
    fn test_empty_input() {
        let breakdown = Breakdown::from_sums(sum_by(&[], |a: &ActivityLike| a.category, |a| a.duration));
        assert!(breakdown.is_empty());
        assert_eq!(breakdown.grand_total, 0.0);
    }

    #[test]
    fn test_zero_total_has_zero_percentages() {
        let items = vec![
            ActivityLike { category: "idle", duration: 0.0 },
            ActivityLike { category: "other", duration: 0.0 },
        ];
        let breakdown = Breakdown::from_sums(sum_by(&items, |a| a.category, |a| a.duration));

        assert_eq!(breakdown.grand_total, 0.0);
        for row in &breakdown.rows {
            assert_eq!(row.percentage, 0.0);
        }
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        let items = vec![
            ActivityLike { category: "a", duration: 1.0 },
            ActivityLike { category: "b", duration: 2.0 },
        ];
        let breakdown = Breakdown::from_sums(sum_by(&items, |a| a.category, |a| a.duration));

        assert_eq!(breakdown.row("a").unwrap().percentage, 33.3);
        assert_eq!(breakdown.row("b").unwrap().percentage, 66.7);
    }

    #[test]
    fn test_rows_in_stable_key_order() {
        let items = vec![
            ActivityLike { category: "zeta", duration: 1.0 },
            ActivityLike { category: "alpha", duration: 1.0 },
        ];
        let breakdown = Breakdown::from_sums(sum_by(&items, |a| a.category, |a| a.duration));
        let keys: Vec<&str> = breakdown.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }
}
