//! Profile API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pb_auth::hash_password;
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{
    CreateProfileDto, KpiRepository, ProfileRepository, ProfileRow, Repository, TicketRepository,
    UpdateProfileDto, UserRoleRepository,
};
use pb_models::Role;
use pb_services::profiles::{CreateProfileService, DeactivateProfileService, ProfileParams};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    email: String,
    name: String,
    department_id: Option<Id>,
    active: bool,
    created_at: String,
    updated_at: String,
    #[serde(rename = "_links")]
    links: ProfileLinks,
}

#[derive(Debug, Serialize)]
struct ProfileLinks {
    #[serde(rename = "self")]
    self_link: Link,
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

impl ProfileResponse {
    fn from_row(row: ProfileRow) -> Self {
        Self {
            type_name: "Profile",
            id: row.id,
            email: row.email,
            name: row.name,
            department_id: row.department_id,
            active: row.active,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
            links: ProfileLinks {
                self_link: Link {
                    href: format!("/api/v1/users/{}", row.id),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFilters {
    pub department_id: Option<Id>,
}

/// GET /api/v1/users
pub async fn list_profiles(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<ProfileFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ProfileRepository::new(pool.clone());

    let (rows, total) = if let Some(department_id) = filters.department_id {
        let rows = repo
            .find_by_department(department_id)
            .await
            .map_err(|e| ApiError::from_repository("Profile", e))?;
        let total = rows.len() as i64;
        (rows, total)
    } else {
        let rows = repo
            .find_all(pagination.limit(), pagination.offset())
            .await
            .map_err(|e| ApiError::from_repository("Profile", e))?;
        let total = repo
            .count()
            .await
            .map_err(|e| ApiError::from_repository("Profile", e))?;
        (rows, total)
    };

    let elements: Vec<ProfileResponse> = rows.into_iter().map(ProfileResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/users/:id
pub async fn get_profile(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ProfileRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?
        .ok_or_else(|| ApiError::not_found("Profile", id))?;

    Ok(HalResponse(ProfileResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub email: String,
    pub name: String,
    pub department_id: Option<Id>,
    pub password: Option<String>,
}

/// POST /api/v1/users
pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = ProfileRepository::new(pool.clone());

    if let Some(ref password) = request.password {
        if password.len() < state.config.password_min_length {
            return Err(ApiError::bad_request(format!(
                "Password must be at least {} characters",
                state.config.password_min_length
            )));
        }
    }

    let service = CreateProfileService::new(&*user);
    let validated = service
        .call(ProfileParams {
            email: request.email,
            name: request.name,
            department_id: request.department_id,
        })
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let hashed_password = match request.password {
        Some(password) => {
            Some(hash_password(&password).map_err(|e| ApiError::internal(e.to_string()))?)
        }
        None => None,
    };

    let row = repo
        .create(CreateProfileDto {
            email: validated.email,
            name: validated.name,
            department_id: validated.department_id,
            hashed_password,
        })
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?;

    Ok((StatusCode::CREATED, HalResponse(ProfileResponse::from_row(row))))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub department_id: Option<Id>,
}

/// PATCH /api/v1/users/:id
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() && user.id != id {
        return Err(ApiError::forbidden("You may only edit your own profile"));
    }

    let pool = state.pool()?;
    let repo = ProfileRepository::new(pool.clone());

    let row = repo
        .update(
            id,
            UpdateProfileDto {
                email: request.email,
                name: request.name,
                department_id: request.department_id,
                active: None,
                hashed_password: None,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?;

    Ok(HalResponse(ProfileResponse::from_row(row)))
}

/// DELETE /api/v1/users/:id
pub async fn delete_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can delete profiles"));
    }

    let pool = state.pool()?;
    let repo = ProfileRepository::new(pool.clone());

    repo.delete(id)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateRequest {
    /// Who inherits the departing user's open tickets and KPIs
    pub successor_id: Id,
}

/// POST /api/v1/users/:id/deactivate
pub async fn deactivate_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<DeactivateRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let profiles = ProfileRepository::new(pool.clone());

    let departing = profiles
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?
        .ok_or_else(|| ApiError::not_found("Profile", id))?
        .into_model();

    let successor = profiles
        .find_by_id(request.successor_id)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?
        .ok_or_else(|| ApiError::not_found("Profile", request.successor_id))?
        .into_model();

    let service = DeactivateProfileService::new(&*user);
    let plan = service
        .call(&departing, &successor)
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let tickets = TicketRepository::new(pool.clone());
    let kpis = KpiRepository::new(pool.clone());

    let moved_tickets = tickets
        .transfer_open_tickets(plan.from_user, plan.to_user)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?;
    let moved_kpis = kpis
        .transfer_ownership(plan.from_user, plan.to_user)
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    profiles
        .deactivate(plan.from_user)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?;

    tracing::info!(
        from = plan.from_user,
        to = plan.to_user,
        moved_tickets,
        moved_kpis,
        "profile deactivated with work transfer"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RolesResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    user_id: Id,
    roles: Vec<String>,
}

/// GET /api/v1/users/:id/roles
pub async fn list_roles(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = UserRoleRepository::new(pool.clone());

    let roles = repo
        .roles_for_user(id)
        .await
        .map_err(|e| ApiError::from_repository("UserRole", e))?;

    Ok(HalResponse(RolesResponse {
        type_name: "RoleAssignments",
        user_id: id,
        roles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// POST /api/v1/users/:id/roles
pub async fn grant_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can grant roles"));
    }

    let role = Role::parse(&request.role)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", request.role)))?;

    let pool = state.pool()?;
    UserRoleRepository::new(pool.clone())
        .grant(id, role.as_str())
        .await
        .map_err(|e| ApiError::from_repository("UserRole", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/:id/roles/:role
pub async fn revoke_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, role)): Path<(Id, String)>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Only administrators can revoke roles"));
    }

    let role = Role::parse(&role)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", role)))?;

    let pool = state.pool()?;
    UserRoleRepository::new(pool.clone())
        .revoke(id, role.as_str())
        .await
        .map_err(|e| ApiError::from_repository("UserRole", e))?;

    Ok(StatusCode::NO_CONTENT)
}
