//! Activity category API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_core::types::Color;
use pb_db::{
    ActivityCategoryRepository, ActivityCategoryRow, CreateCategoryDto, Repository,
    UpdateCategoryDto,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    name: String,
    color: String,
}

impl CategoryResponse {
    fn from_row(row: ActivityCategoryRow) -> Self {
        Self {
            type_name: "ActivityCategory",
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub color: String,
}

fn validate_color(color: &str) -> ApiResult<()> {
    if !Color::new(color).is_valid_hex() {
        return Err(ApiError::bad_request(
            "Color must be a hex code like #A1B2C3",
        ));
    }
    Ok(())
}

/// GET /api/v1/activity_categories
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityCategoryRepository::new(pool.clone());

    let rows = repo
        .find_all(pagination.limit(), pagination.offset())
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?;
    let total = repo
        .count()
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?;

    let elements: Vec<CategoryResponse> =
        rows.into_iter().map(CategoryResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/activity_categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ActivityCategoryRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?
        .ok_or_else(|| ApiError::not_found("ActivityCategory", id))?;

    Ok(HalResponse(CategoryResponse::from_row(row)))
}

/// POST /api/v1/activity_categories
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage categories"));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Category name can't be blank"));
    }
    validate_color(&request.color)?;

    let pool = state.pool()?;
    let row = ActivityCategoryRepository::new(pool.clone())
        .create(CreateCategoryDto {
            name: request.name,
            color: request.color,
        })
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?;

    Ok((StatusCode::CREATED, HalResponse(CategoryResponse::from_row(row))))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// PATCH /api/v1/activity_categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage categories"));
    }
    if let Some(ref color) = request.color {
        validate_color(color)?;
    }

    let pool = state.pool()?;
    let row = ActivityCategoryRepository::new(pool.clone())
        .update(
            id,
            UpdateCategoryDto {
                name: request.name,
                color: request.color,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?;

    Ok(HalResponse(CategoryResponse::from_row(row)))
}

/// DELETE /api/v1/activity_categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can manage categories"));
    }

    let pool = state.pool()?;
    ActivityCategoryRepository::new(pool.clone())
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository("ActivityCategory", e))?;

    Ok(StatusCode::NO_CONTENT)
}
