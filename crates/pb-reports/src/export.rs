//! CSV export for report breakdowns

use thiserror::Error;

use crate::aggregation::Breakdown;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Render a breakdown as CSV with a header row and a trailing total row
pub fn breakdown_to_csv(breakdown: &Breakdown, key_header: &str) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([key_header, "total", "percentage"])?;
    for row in &breakdown.rows {
        writer.write_record([
            row.key.as_str(),
            &format_number(row.total),
            &format_number(row.percentage),
        ])?;
    }
    writer.write_record(["TOTAL", &format_number(breakdown.grand_total), "100"])?;

    let bytes = writer.into_inner().map_err(|e| {
        ExportError::Csv(csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        )))
    })?;
    Ok(String::from_utf8(bytes)?)
}

/// Whole numbers print without a decimal point; everything else keeps
/// one decimal, matching the dashboard display
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::sum_by;

    struct Item {
        key: &'static str,
        weight: f64,
    }

    #[test]
    fn test_csv_output() {
        let items = vec![
            Item { key: "meeting", weight: 90.0 },
            Item { key: "project", weight: 90.0 },
        ];
        let breakdown = Breakdown::from_sums(sum_by(&items, |i| i.key, |i| i.weight));

        let csv = breakdown_to_csv(&breakdown, "category").unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "category,total,percentage");
        assert_eq!(lines[1], "meeting,90,50");
        assert_eq!(lines[2], "project,90,50");
        assert_eq!(lines[3], "TOTAL,180,100");
    }

    #[test]
    fn test_csv_fractional_values() {
        let items = vec![
            Item { key: "a", weight: 1.0 },
            Item { key: "b", weight: 2.0 },
        ];
        let breakdown = Breakdown::from_sums(sum_by(&items, |i| i.key, |i| i.weight));

        let csv = breakdown_to_csv(&breakdown, "bucket").unwrap();
        assert!(csv.contains("a,1,33.3"));
        assert!(csv.contains("b,2,66.7"));
    }

    #[test]
    fn test_empty_breakdown() {
        let breakdown = Breakdown::from_sums(sum_by(&[], |i: &Item| i.key, |i| i.weight));
        let csv = breakdown_to_csv(&breakdown, "bucket").unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "TOTAL,0,100");
    }
}
