//! Authentication handlers

use axum::{extract::State, response::IntoResponse, Json};
use pb_auth::verify_password;
use pb_db::{ProfileRepository, UserRoleRepository};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    token: String,
    user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserSummary {
    id: i64,
    email: String,
    name: String,
    department_id: Option<i64>,
    roles: Vec<String>,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let profiles = ProfileRepository::new(pool.clone());
    let roles_repo = UserRoleRepository::new(pool.clone());

    let profile = profiles
        .find_by_email(&request.email)
        .await
        .map_err(|e| ApiError::from_repository("Profile", e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !profile.is_active() {
        return Err(ApiError::unauthorized("Account is deactivated"));
    }

    let stored_hash = profile
        .hashed_password
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&request.password, stored_hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let roles = roles_repo
        .roles_for_user(profile.id)
        .await
        .map_err(|e| ApiError::from_repository("UserRole", e))?;

    let token = state
        .jwt
        .create_token(
            profile.id,
            Some(profile.email.clone()),
            profile.department_id,
            roles.clone(),
            state.config.token_expiration_seconds,
        )
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(HalResponse(LoginResponse {
        type_name: "Session",
        token,
        user: UserSummary {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            department_id: profile.department_id,
            roles,
        },
    }))
}

/// GET /api/v1/auth/me
pub async fn me(user: AuthenticatedUser) -> ApiResult<impl IntoResponse> {
    Ok(HalResponse(UserSummary {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        department_id: user.department_id,
        roles: user.role_names(),
    }))
}
