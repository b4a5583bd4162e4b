//! Department API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{CreateDepartmentDto, DepartmentRepository, DepartmentRow, Repository, UpdateDepartmentDto};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    name: String,
}

impl DepartmentResponse {
    fn from_row(row: DepartmentRow) -> Self {
        Self {
            type_name: "Department",
            id: row.id,
            name: row.name,
        }
    }
}

/// GET /api/v1/departments
pub async fn list_departments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = DepartmentRepository::new(pool.clone());

    let rows = repo
        .find_all(pagination.limit(), pagination.offset())
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?;
    let total = repo
        .count()
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?;

    let elements: Vec<DepartmentResponse> =
        rows.into_iter().map(DepartmentResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/departments/:id
pub async fn get_department(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = DepartmentRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?
        .ok_or_else(|| ApiError::not_found("Department", id))?;

    Ok(HalResponse(DepartmentResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
}

/// POST /api/v1/departments
pub async fn create_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage departments"));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Department name can't be blank"));
    }

    let pool = state.pool()?;
    let row = DepartmentRepository::new(pool.clone())
        .create(CreateDepartmentDto { name: request.name })
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?;

    Ok((StatusCode::CREATED, HalResponse(DepartmentResponse::from_row(row))))
}

/// PATCH /api/v1/departments/:id
pub async fn update_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage departments"));
    }

    let pool = state.pool()?;
    let row = DepartmentRepository::new(pool.clone())
        .update(
            id,
            UpdateDepartmentDto {
                name: Some(request.name),
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?;

    Ok(HalResponse(DepartmentResponse::from_row(row)))
}

/// DELETE /api/v1/departments/:id
pub async fn delete_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage departments"));
    }

    let pool = state.pool()?;
    DepartmentRepository::new(pool.clone())
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository("Department", e))?;

    Ok(StatusCode::NO_CONTENT)
}
