//! Reporting API handlers
//!
//! Thin HTTP surface over `pb-reports`: fetch the rows, aggregate in
//! memory, render as JSON or CSV.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use pb_core::traits::UserContext;
use pb_db::{ActivityRepository, KpiRepository, TicketRepository};
use pb_models::{Activity, KpiTarget, Ticket};
use pb_reports::aggregation::Breakdown;
use pb_reports::{breakdown_to_csv, reports};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse};

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD"))
}

fn require_reporting_access(user: &AuthenticatedUser) -> ApiResult<()> {
    if user.can_view_company_dashboards() || user.has_role("department_manager") {
        Ok(())
    } else {
        Err(ApiError::forbidden("You may not view company reports"))
    }
}

fn render(breakdown: Breakdown, key_header: &str, format: Option<&str>) -> ApiResult<Response> {
    match format {
        Some("csv") => {
            let csv = breakdown_to_csv(&breakdown, key_header)
                .map_err(|e| ApiError::internal(e.to_string()))?;
            Ok(([("content-type", "text/csv; charset=utf-8")], csv).into_response())
        }
        Some("json") | None => Ok(HalResponse(breakdown).into_response()),
        Some(other) => Err(ApiError::bad_request(format!("Unknown format: {}", other))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReportQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/v1/reports/activities
pub async fn activity_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ActivityReportQuery>,
) -> ApiResult<Response> {
    require_reporting_access(&user)?;

    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;

    let pool = state.pool()?;
    let activities: Vec<Activity> = ActivityRepository::new(pool.clone())
        .find_between(from, to)
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?
        .into_iter()
        .map(|row| row.into_model())
        .collect();

    let (breakdown, key_header) = match query.group_by.as_deref() {
        Some("day") => (reports::activity_minutes_by_day(&activities), "day"),
        Some("category") | None => (
            reports::activity_minutes_by_category(&activities),
            "category",
        ),
        Some(other) => {
            return Err(ApiError::bad_request(format!("Unknown groupBy: {}", other)))
        }
    };

    render(breakdown, key_header, query.format.as_deref())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReportQuery {
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/v1/reports/tickets
pub async fn ticket_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TicketReportQuery>,
) -> ApiResult<Response> {
    require_reporting_access(&user)?;

    let pool = state.pool()?;
    let tickets: Vec<Ticket> = TicketRepository::new(pool.clone())
        .find_all_for_report()
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .into_iter()
        .map(|row| row.into_model())
        .collect();

    let (breakdown, key_header) = match query.group_by.as_deref() {
        Some("department") => (reports::ticket_counts_by_department(&tickets), "department"),
        Some("status") | None => (reports::ticket_counts_by_status(&tickets), "status"),
        Some(other) => {
            return Err(ApiError::bad_request(format!("Unknown groupBy: {}", other)))
        }
    };

    render(breakdown, key_header, query.format.as_deref())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReportQuery {
    /// Evaluation day for health derivation, defaults to today
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/v1/reports/kpis
pub async fn kpi_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<KpiReportQuery>,
) -> ApiResult<Response> {
    require_reporting_access(&user)?;

    let today = match query.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => Utc::now().date_naive(),
    };

    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());
    let rows = repo
        .find_active()
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    let mut kpis: Vec<KpiTarget> = Vec::with_capacity(rows.len());
    for row in rows {
        // Health derivation does not need assignees
        kpis.push(row.into_model(Vec::new()));
    }

    let breakdown = reports::kpi_health_by_department(&kpis, today);
    render(breakdown, "department:health", query.format.as_deref())
}
