//! Concrete dashboard reports over domain collections

use chrono::NaiveDate;
use pb_models::{Activity, KpiTarget, Ticket};

use crate::aggregation::{count_by, sum_by, Breakdown};

/// Activity minutes grouped by category id
pub fn activity_minutes_by_category(activities: &[Activity]) -> Breakdown {
    Breakdown::from_sums(sum_by(
        activities,
        |a| a.category_id,
        |a| a.duration_minutes as f64,
    ))
}

/// Activity minutes grouped by calendar day
pub fn activity_minutes_by_day(activities: &[Activity]) -> Breakdown {
    Breakdown::from_sums(sum_by(
        activities,
        |a| a.date,
        |a| a.duration_minutes as f64,
    ))
}

/// Ticket counts grouped by workflow status
pub fn ticket_counts_by_status(tickets: &[Ticket]) -> Breakdown {
    Breakdown::from_counts(count_by(tickets, |t| t.status.as_str()))
}

/// Ticket counts grouped by target department
pub fn ticket_counts_by_department(tickets: &[Ticket]) -> Breakdown {
    Breakdown::from_counts(count_by(tickets, |t| t.target_department_id))
}

/// KPI health counts per department as of the given day
pub fn kpi_health_by_department(kpis: &[KpiTarget], today: NaiveDate) -> Breakdown {
    Breakdown::from_counts(count_by(kpis, |k| {
        format!("{}:{}", k.department_id, k.snapshot(today).health.as_str())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pb_models::TicketStatus;

    fn activity(category_id: i64, date: NaiveDate, minutes: i32) -> Activity {
        Activity {
            id: None,
            title: "work".into(),
            date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: minutes,
            category_id,
            user_id: 1,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_minutes_by_category() {
        let activities = vec![
            activity(1, day(11), 60),
            activity(1, day(11), 30),
            activity(2, day(12), 90),
        ];

        let breakdown = activity_minutes_by_category(&activities);
        assert_eq!(breakdown.grand_total, 180.0);
        assert_eq!(breakdown.row("1").unwrap().total, 90.0);
        assert_eq!(breakdown.row("1").unwrap().percentage, 50.0);
        assert_eq!(breakdown.row("2").unwrap().percentage, 50.0);
    }

    #[test]
    fn test_minutes_by_day() {
        let activities = vec![
            activity(1, day(11), 45),
            activity(2, day(11), 15),
            activity(1, day(12), 60),
        ];

        let breakdown = activity_minutes_by_day(&activities);
        assert_eq!(breakdown.row("2024-03-11").unwrap().total, 60.0);
        assert_eq!(breakdown.row("2024-03-12").unwrap().total, 60.0);
    }

    #[test]
    fn test_ticket_counts_by_status() {
        let mut open = Ticket::default();
        open.status = TicketStatus::Open;
        let mut resolved = Ticket::default();
        resolved.status = TicketStatus::Resolved;

        let breakdown = ticket_counts_by_status(&[open.clone(), open, resolved]);
        assert_eq!(breakdown.row("open").unwrap().total, 2.0);
        assert_eq!(breakdown.row("resolved").unwrap().total, 1.0);
    }

    #[test]
    fn test_kpi_health_by_department() {
        let mut on_pace = KpiTarget {
            department_id: 1,
            target_value: 100.0,
            current_value: 60.0,
            start_date: day(1),
            end_date: day(11),
            ..Default::default()
        };
        on_pace.title = "On pace".into();

        let mut overdue = KpiTarget {
            department_id: 2,
            target_value: 100.0,
            current_value: 10.0,
            start_date: day(1),
            end_date: day(5),
            ..Default::default()
        };
        overdue.title = "Overdue".into();

        let breakdown = kpi_health_by_department(&[on_pace, overdue], day(6));
        assert_eq!(breakdown.row("1:success").unwrap().total, 1.0);
        assert_eq!(breakdown.row("2:danger").unwrap().total, 1.0);
    }
}
