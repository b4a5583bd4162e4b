//! Meeting room API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDateTime;
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{
    CreateMeetingRoomDto, MeetingRoomRepository, MeetingRoomRow, Repository,
    ReservationRepository, UpdateMeetingRoomDto,
};
use pb_models::{Reservation, RoomAvailability};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    name: String,
    capacity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    responsible_id: Option<Id>,
}

impl RoomResponse {
    fn from_row(row: MeetingRoomRow) -> Self {
        Self {
            type_name: "MeetingRoom",
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            location: row.location,
            responsible_id: row.responsible_id,
        }
    }
}

pub(crate) fn parse_datetime(value: &str) -> ApiResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| ApiError::bad_request("Invalid datetime format. Use YYYY-MM-DDTHH:MM"))
}

/// GET /api/v1/meeting_rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = MeetingRoomRepository::new(pool.clone());

    let rows = repo
        .find_all(pagination.limit(), pagination.offset())
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?;
    let total = repo
        .count()
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?;

    let elements: Vec<RoomResponse> = rows.into_iter().map(RoomResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/meeting_rooms/:id
pub async fn get_room(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = MeetingRoomRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?
        .ok_or_else(|| ApiError::not_found("MeetingRoom", id))?;

    Ok(HalResponse(RoomResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub name: String,
    pub capacity: i32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub responsible_id: Option<Id>,
}

/// POST /api/v1/meeting_rooms
pub async fn create_room(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<RoomRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage meeting rooms"));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Room name can't be blank"));
    }
    if request.capacity <= 0 {
        return Err(ApiError::bad_request("Capacity must be greater than 0"));
    }

    let pool = state.pool()?;
    let row = MeetingRoomRepository::new(pool.clone())
        .create(CreateMeetingRoomDto {
            name: request.name,
            capacity: request.capacity,
            location: request.location,
            responsible_id: request.responsible_id,
        })
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?;

    Ok((StatusCode::CREATED, HalResponse(RoomResponse::from_row(row))))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub responsible_id: Option<Id>,
}

/// PATCH /api/v1/meeting_rooms/:id
pub async fn update_room(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateRoomRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage meeting rooms"));
    }
    if let Some(capacity) = request.capacity {
        if capacity <= 0 {
            return Err(ApiError::bad_request("Capacity must be greater than 0"));
        }
    }

    let pool = state.pool()?;
    let row = MeetingRoomRepository::new(pool.clone())
        .update(
            id,
            UpdateMeetingRoomDto {
                name: request.name,
                capacity: request.capacity,
                location: request.location,
                responsible_id: request.responsible_id,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?;

    Ok(HalResponse(RoomResponse::from_row(row)))
}

/// DELETE /api/v1/meeting_rooms/:id
pub async fn delete_room(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage meeting rooms"));
    }

    let pool = state.pool()?;
    MeetingRoomRepository::new(pool.clone())
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository("MeetingRoom", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub capacity: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    start: String,
    end: String,
    rooms: Vec<RoomAvailability>,
}

/// GET /api/v1/meeting_rooms/availability
///
/// Lists rooms annotated available/busy for the requested window. A room
/// counts as busy when an approved reservation overlaps the window.
pub async fn room_availability(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<impl IntoResponse> {
    let start = parse_datetime(&query.start)?;
    let end = parse_datetime(&query.end)?;
    if start >= end {
        return Err(ApiError::bad_request("End must be after start"));
    }

    let pool = state.pool()?;
    let rooms_repo = MeetingRoomRepository::new(pool.clone());
    let reservations_repo = ReservationRepository::new(pool.clone());

    let rooms = match query.capacity {
        Some(capacity) => rooms_repo
            .find_with_capacity(capacity)
            .await
            .map_err(|e| ApiError::from_repository("MeetingRoom", e))?,
        None => rooms_repo
            .find_all(1000, 0)
            .await
            .map_err(|e| ApiError::from_repository("MeetingRoom", e))?,
    };

    let mut annotated = Vec::with_capacity(rooms.len());
    for room in rooms {
        let reservations: Vec<Reservation> = reservations_repo
            .find_blocking_for_room(room.id)
            .await
            .map_err(|e| ApiError::from_repository("Reservation", e))?
            .into_iter()
            .map(|row| row.into_model())
            .collect();

        annotated.push(RoomAvailability::for_window(
            room.into_model(),
            &reservations,
            start,
            end,
        ));
    }

    Ok(HalResponse(AvailabilityResponse {
        type_name: "RoomAvailabilityCollection",
        start: start.to_string(),
        end: end.to_string(),
        rooms: annotated,
    }))
}
