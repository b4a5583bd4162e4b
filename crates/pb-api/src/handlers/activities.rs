//! Activity API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{ActivityRepository, ActivityRow, CreateActivityDto, Repository, UpdateActivityDto};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    title: String,
    date: String,
    start_time: String,
    end_time: String,
    duration_minutes: i32,
    category_id: Id,
    user_id: Id,
}

impl ActivityResponse {
    fn from_row(row: ActivityRow) -> Self {
        Self {
            type_name: "Activity",
            id: row.id,
            title: row.title,
            date: row.date.to_string(),
            start_time: row.start_time.format("%H:%M").to_string(),
            end_time: row.end_time.format("%H:%M").to_string(),
            duration_minutes: row.duration_minutes,
            category_id: row.category_id,
            user_id: row.user_id,
        }
    }
}

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD"))
}

fn parse_time(value: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ApiError::bad_request("Invalid time format. Use HH:MM"))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilters {
    pub user_id: Option<Id>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/v1/activities
pub async fn list_activities(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<ActivityFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityRepository::new(pool.clone());

    let (rows, total) = match (&filters.from, &filters.to) {
        (Some(from), Some(to)) => {
            let from = parse_date(from)?;
            let to = parse_date(to)?;
            let target_user = filters.user_id.unwrap_or(user.id);
            let rows = repo
                .find_by_user_between(target_user, from, to)
                .await
                .map_err(|e| ApiError::from_repository("Activity", e))?;
            let total = rows.len() as i64;
            (rows, total)
        }
        _ => {
            let rows = repo
                .find_all(pagination.limit(), pagination.offset())
                .await
                .map_err(|e| ApiError::from_repository("Activity", e))?;
            let total = repo
                .count()
                .await
                .map_err(|e| ApiError::from_repository("Activity", e))?;
            (rows, total)
        }
    };

    let elements: Vec<ActivityResponse> =
        rows.into_iter().map(ActivityResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/activities/:id
pub async fn get_activity(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?
        .ok_or_else(|| ApiError::not_found("Activity", id))?;

    Ok(HalResponse(ActivityResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub category_id: Id,
}

/// POST /api/v1/activities
pub async fn create_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateActivityRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Activity title can't be blank"));
    }

    let date = parse_date(&request.date)?;
    let start_time = parse_time(&request.start_time)?;
    let end_time = parse_time(&request.end_time)?;
    if start_time >= end_time {
        return Err(ApiError::bad_request("End time must be after start time"));
    }

    let duration_minutes = (end_time - start_time).num_minutes() as i32;

    let pool = state.pool()?;
    let row = ActivityRepository::new(pool.clone())
        .create(CreateActivityDto {
            title: request.title,
            date,
            start_time,
            end_time,
            duration_minutes,
            category_id: request.category_id,
            user_id: user.id,
        })
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?;

    Ok((StatusCode::CREATED, HalResponse(ActivityResponse::from_row(row))))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category_id: Option<Id>,
}

/// PATCH /api/v1/activities/:id
pub async fn update_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateActivityRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityRepository::new(pool.clone());

    let existing = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?
        .ok_or_else(|| ApiError::not_found("Activity", id))?;

    if existing.user_id != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You may only edit your own activities"));
    }

    let date = request.date.as_deref().map(parse_date).transpose()?;
    let start_time = request.start_time.as_deref().map(parse_time).transpose()?;
    let end_time = request.end_time.as_deref().map(parse_time).transpose()?;

    // Recompute the stored duration from the effective window
    let effective_start = start_time.unwrap_or(existing.start_time);
    let effective_end = end_time.unwrap_or(existing.end_time);
    if effective_start >= effective_end {
        return Err(ApiError::bad_request("End time must be after start time"));
    }
    let duration_minutes = (effective_end - effective_start).num_minutes() as i32;

    let row = repo
        .update(
            id,
            UpdateActivityDto {
                title: request.title,
                date,
                start_time,
                end_time,
                duration_minutes: Some(duration_minutes),
                category_id: request.category_id,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?;

    Ok(HalResponse(ActivityResponse::from_row(row)))
}

/// DELETE /api/v1/activities/:id
pub async fn delete_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityRepository::new(pool.clone());

    let existing = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?
        .ok_or_else(|| ApiError::not_found("Activity", id))?;

    if existing.user_id != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You may only delete your own activities"));
    }

    repo.delete(id)
        .await
        .map_err(|e| ApiError::from_repository("Activity", e))?;

    Ok(StatusCode::NO_CONTENT)
}
