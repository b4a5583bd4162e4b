//! Notification API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::Id;
use pb_db::{NotificationRepository, NotificationRow};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    user_id: Id,
    category: String,
    priority: String,
    title: String,
    message: String,
    is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    created_at: String,
}

impl NotificationResponse {
    fn from_row(row: NotificationRow) -> Self {
        Self {
            type_name: "Notification",
            id: row.id,
            user_id: row.user_id,
            category: row.category,
            priority: row.priority,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            link: row.link,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilters {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<NotificationFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = NotificationRepository::new(pool.clone());

    let result = repo
        .find_for_user(
            user.id,
            filters.unread_only,
            pb_db::Pagination::new(pagination.limit(), pagination.offset()),
        )
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    let elements: Vec<NotificationResponse> = result
        .items
        .into_iter()
        .map(NotificationResponse::from_row)
        .collect();
    Ok(HalResponse(CollectionResponse::new(
        elements,
        result.total,
        pagination.0,
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCountResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    count: i64,
}

/// GET /api/v1/notifications/unread_count
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let count = NotificationRepository::new(pool.clone())
        .unread_count(user.id)
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    Ok(HalResponse(UnreadCountResponse {
        type_name: "UnreadCount",
        count,
    }))
}

/// POST /api/v1/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    NotificationRepository::new(pool.clone())
        .mark_read(id, user.id)
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read_all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let changed = NotificationRepository::new(pool.clone())
        .mark_all_read(user.id)
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    tracing::debug!(user_id = user.id, changed, "marked notifications read");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    NotificationRepository::new(pool.clone())
        .delete(id, user.id)
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    Ok(StatusCode::NO_CONTENT)
}
