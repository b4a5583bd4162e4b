//! Reservation API handlers
//!
//! Booking and rescheduling validate through the reservation services,
//! which run the in-memory conflict check over the room's non-rejected
//! reservations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{
    CreateNotificationDto, CreateReservationDto, NotificationRepository, Repository,
    ReservationRepository, ReservationRow, UpdateReservationDto,
};
use pb_models::{Reservation, ReservationStatus};
use pb_services::reservations::{
    ApproveReservationService, CreateReservationService, ReservationParams,
    RescheduleReservationService,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};
use crate::handlers::meeting_rooms::parse_datetime;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    room_id: Id,
    requested_by: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    approved_by: Option<Id>,
    start_time: String,
    end_time: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    created_at: String,
    #[serde(rename = "_links")]
    links: ReservationLinks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReservationLinks {
    #[serde(rename = "self")]
    self_link: Link,
    room: Link,
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

impl ReservationResponse {
    fn from_row(row: ReservationRow) -> Self {
        Self {
            type_name: "Reservation",
            id: row.id,
            room_id: row.room_id,
            requested_by: row.requested_by,
            approved_by: row.approved_by,
            start_time: row.start_time.to_string(),
            end_time: row.end_time.to_string(),
            status: row.status,
            notes: row.notes,
            created_at: row.created_at.to_rfc3339(),
            links: ReservationLinks {
                self_link: Link {
                    href: format!("/api/v1/reservations/{}", row.id),
                },
                room: Link {
                    href: format!("/api/v1/meeting_rooms/{}", row.room_id),
                },
            },
        }
    }
}

async fn blocking_models(
    repo: &ReservationRepository,
    room_id: Id,
) -> ApiResult<Vec<Reservation>> {
    Ok(repo
        .find_blocking_for_room(room_id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?
        .into_iter()
        .map(|row| row.into_model())
        .collect())
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilters {
    pub room_id: Option<Id>,
    /// Restrict to the caller's own requests
    #[serde(default)]
    pub mine: bool,
}

/// GET /api/v1/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<ReservationFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let (rows, total) = if let Some(room_id) = filters.room_id {
        let result = repo
            .find_by_room(
                room_id,
                pb_db::Pagination::new(pagination.limit(), pagination.offset()),
            )
            .await
            .map_err(|e| ApiError::from_repository("Reservation", e))?;
        (result.items, result.total)
    } else if filters.mine {
        let rows = repo
            .find_by_requester(user.id)
            .await
            .map_err(|e| ApiError::from_repository("Reservation", e))?;
        let total = rows.len() as i64;
        (rows, total)
    } else {
        let rows = repo
            .find_all(pagination.limit(), pagination.offset())
            .await
            .map_err(|e| ApiError::from_repository("Reservation", e))?;
        let total = repo
            .count()
            .await
            .map_err(|e| ApiError::from_repository("Reservation", e))?;
        (rows, total)
    };

    let elements: Vec<ReservationResponse> =
        rows.into_iter().map(ReservationResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/reservations/:id
pub async fn get_reservation(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    Ok(HalResponse(ReservationResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub room_id: Id,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/v1/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReservationRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let start_time = parse_datetime(&request.start_time)?;
    let end_time = parse_datetime(&request.end_time)?;

    let existing = blocking_models(&repo, request.room_id).await?;

    let service = CreateReservationService::new(&*user);
    let validated = service
        .call(
            ReservationParams {
                room_id: request.room_id,
                requested_by: user.id,
                start_time,
                end_time,
                notes: request.notes,
            },
            &existing,
        )
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let row = repo
        .create(CreateReservationDto {
            room_id: validated.room_id,
            requested_by: validated.requested_by,
            start_time: validated.start_time,
            end_time: validated.end_time,
            notes: validated.notes,
        })
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?;

    Ok((
        StatusCode::CREATED,
        HalResponse(ReservationResponse::from_row(row)),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub start_time: String,
    pub end_time: String,
}

/// PATCH /api/v1/reservations/:id
pub async fn reschedule_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    if row.requested_by != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You may only reschedule your own reservations"));
    }

    let start_time = parse_datetime(&request.start_time)?;
    let end_time = parse_datetime(&request.end_time)?;
    let existing = blocking_models(&repo, row.room_id).await?;

    let service = RescheduleReservationService::new(&*user);
    let validated = service
        .call(row.into_model(), start_time, end_time, &existing)
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    // Rescheduling reopens the approval workflow
    repo.set_status(id, ReservationStatus::Pending.as_str(), None)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?;

    let row = repo
        .update(
            id,
            UpdateReservationDto {
                start_time: Some(validated.start_time),
                end_time: Some(validated.end_time),
                notes: None,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?;

    Ok(HalResponse(ReservationResponse::from_row(row)))
}

/// POST /api/v1/reservations/:id/approve
pub async fn approve_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    decide_reservation(state, user, id, true).await
}

/// POST /api/v1/reservations/:id/reject
pub async fn reject_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    decide_reservation(state, user, id, false).await
}

async fn decide_reservation(
    state: AppState,
    user: AuthenticatedUser,
    id: Id,
    approve: bool,
) -> ApiResult<axum::response::Response> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    let reservation = row.into_model();
    let service = ApproveReservationService::new(&*user);

    let decided = if approve {
        let approved: Vec<Reservation> = blocking_models(&repo, reservation.room_id)
            .await?
            .into_iter()
            .filter(|r| r.status == ReservationStatus::Approved)
            .collect();
        service.approve(reservation, &approved)
    } else {
        service.reject(reservation)
    }
    .into_result()
    .map_err(|e| match e {
        pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
        other => ApiError::internal(other.to_string()),
    })?;

    let row = repo
        .set_status(id, decided.status.as_str(), decided.approved_by)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?;

    // Tell the requester what happened
    let note =
        pb_notifications::Notification::reservation_decided(row.requested_by, row.id, approve);
    NotificationRepository::new(pool.clone())
        .create(CreateNotificationDto {
            user_id: note.user_id,
            category: note.category.as_str().to_string(),
            priority: note.priority.as_str().to_string(),
            title: note.title.clone(),
            message: note.message.clone(),
            link: note.link.clone(),
        })
        .await
        .map_err(|e| ApiError::from_repository("Notification", e))?;

    Ok(HalResponse(ReservationResponse::from_row(row)).into_response())
}

/// DELETE /api/v1/reservations/:id
pub async fn delete_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ReservationRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    if row.requested_by != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You may only cancel your own reservations"));
    }

    repo.delete(id)
        .await
        .map_err(|e| ApiError::from_repository("Reservation", e))?;

    Ok(StatusCode::NO_CONTENT)
}
