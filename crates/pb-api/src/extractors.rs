//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use pb_auth::{extract_bearer_token, CurrentUser, JwtService};
use pb_core::pagination::PaginationParams;
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::ApiError;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub jwt: Arc<JwtService>,
    pub db: Option<PgPool>,
}

#[derive(Clone)]
pub struct ApiConfig {
    pub app_title: String,
    pub token_expiration_seconds: i64,
    pub password_min_length: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            app_title: "Pulseboard".into(),
            token_expiration_seconds: 86400,
            password_min_length: 10,
        }
    }
}

impl AppState {
    pub fn new(config: ApiConfig, jwt: JwtService, db: Option<PgPool>) -> Self {
        Self {
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            db,
        }
    }

    /// The database pool, or a 500 when running without a database
    pub fn pool(&self) -> Result<&PgPool, ApiError> {
        self.db
            .as_ref()
            .ok_or_else(|| ApiError::internal("Database is not configured"))
    }
}

/// Authenticated user extractor: validates the bearer token and builds
/// the permission context from its claims
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let claims = app_state
            .jwt
            .validate_token(token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid subject in token"))?;

        let mut user = CurrentUser::new(user_id, claims.email.unwrap_or_default(), "")
            .with_role_names(claims.roles.iter().map(String::as_str));
        if let Some(dept) = claims.dept {
            user = user.with_department(dept);
        }

        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pagination parameters extractor; malformed query strings fall back to
/// the defaults
pub struct Pagination(pub PaginationParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(PaginationParams::default()));
        Ok(Pagination(params))
    }
}

impl std::ops::Deref for Pagination {
    type Target = PaginationParams;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// HAL+JSON response wrapper
pub struct HalResponse<T: serde::Serialize>(pub T);

impl<T: serde::Serialize> axum::response::IntoResponse for HalResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let json = serde_json::to_string(&self.0).unwrap_or_default();
        axum::response::Response::builder()
            .status(200)
            .header("content-type", "application/hal+json; charset=utf-8")
            .body(axum::body::Body::from(json))
            .unwrap_or_default()
    }
}
