//! API routes

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{
    activities, auth, categories, departments, kpis, meeting_rooms, notifications, profiles,
    reports, reservations, tickets,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/departments", departments_router())
        .nest("/kpis", kpis_router())
        .nest("/tickets", tickets_router())
        .nest("/activities", activities_router())
        .nest("/activity_categories", categories_router())
        .nest("/meeting_rooms", meeting_rooms_router())
        .nest("/reservations", reservations_router())
        .nest("/notifications", notifications_router())
        .nest("/reports", reports_router())
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(profiles::list_profiles))
        .route("/", post(profiles::create_profile))
        .route("/:id", get(profiles::get_profile))
        .route("/:id", patch(profiles::update_profile))
        .route("/:id", delete(profiles::delete_profile))
        .route("/:id/deactivate", post(profiles::deactivate_profile))
        .route("/:id/roles", get(profiles::list_roles))
        .route("/:id/roles", post(profiles::grant_role))
        .route("/:id/roles/:role", delete(profiles::revoke_role))
}

fn departments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(departments::list_departments))
        .route("/", post(departments::create_department))
        .route("/:id", get(departments::get_department))
        .route("/:id", patch(departments::update_department))
        .route("/:id", delete(departments::delete_department))
}

fn kpis_router() -> Router<AppState> {
    Router::new()
        .route("/", get(kpis::list_kpis))
        .route("/", post(kpis::create_kpi))
        .route("/:id", get(kpis::get_kpi))
        .route("/:id", patch(kpis::update_kpi))
        .route("/:id", delete(kpis::delete_kpi))
        .route("/:id/snapshot", get(kpis::kpi_snapshot))
        .route("/:id/progress", get(kpis::list_progress))
        .route("/:id/progress", post(kpis::record_progress))
        .route("/:id/comments", get(kpis::list_comments))
        .route("/:id/comments", post(kpis::create_comment))
}

fn tickets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets))
        .route("/", post(tickets::create_ticket))
        .route("/:id", get(tickets::get_ticket))
        .route("/:id", patch(tickets::update_ticket))
        .route("/:id", delete(tickets::delete_ticket))
        .route("/:id/status", post(tickets::transition_ticket))
        .route("/:id/comments", get(tickets::list_comments))
        .route("/:id/comments", post(tickets::create_comment))
}

fn activities_router() -> Router<AppState> {
    Router::new()
        .route("/", get(activities::list_activities))
        .route("/", post(activities::create_activity))
        .route("/:id", get(activities::get_activity))
        .route("/:id", patch(activities::update_activity))
        .route("/:id", delete(activities::delete_activity))
}

fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_categories))
        .route("/", post(categories::create_category))
        .route("/:id", get(categories::get_category))
        .route("/:id", patch(categories::update_category))
        .route("/:id", delete(categories::delete_category))
}

fn meeting_rooms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(meeting_rooms::list_rooms))
        .route("/", post(meeting_rooms::create_room))
        .route("/availability", get(meeting_rooms::room_availability))
        .route("/:id", get(meeting_rooms::get_room))
        .route("/:id", patch(meeting_rooms::update_room))
        .route("/:id", delete(meeting_rooms::delete_room))
}

fn reservations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(reservations::list_reservations))
        .route("/", post(reservations::create_reservation))
        .route("/:id", get(reservations::get_reservation))
        .route("/:id", patch(reservations::reschedule_reservation))
        .route("/:id", delete(reservations::delete_reservation))
        .route("/:id/approve", post(reservations::approve_reservation))
        .route("/:id/reject", post(reservations::reject_reservation))
}

fn notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/unread_count", get(notifications::unread_count))
        .route("/read_all", post(notifications::mark_all_read))
        .route("/:id/read", post(notifications::mark_read))
        .route("/:id", delete(notifications::delete_notification))
}

fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/activities", get(reports::activity_report))
        .route("/tickets", get(reports::ticket_report))
        .route("/kpis", get(reports::kpi_report))
}

async fn api_root(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<ApiRoot> {
    axum::Json(ApiRoot {
        type_name: "Root".into(),
        instance_name: state.config.app_title.clone(),
    })
}

#[derive(Serialize)]
struct ApiRoot {
    #[serde(rename = "_type")]
    type_name: String,
    #[serde(rename = "instanceName")]
    instance_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pb_auth::JwtService;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState::new(
            crate::extractors::ApiConfig::default(),
            JwtService::new(b"test-secret-key-at-least-32-bytes"),
            None,
        );
        router().with_state(state)
    }

    #[tokio::test]
    async fn test_api_root() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unauthenticated_request_is_rejected() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/kpis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_request_without_database_is_500() {
        let jwt = JwtService::new(b"test-secret-key-at-least-32-bytes");
        let token = jwt
            .create_token(1, Some("a@example.com".into()), None, vec!["admin".into()], 3600)
            .unwrap();

        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/kpis")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let jwt = JwtService::new(b"test-secret-key-at-least-32-bytes");
        // Past the 60s validation leeway
        let token = jwt.create_token(1, None, None, vec![], -300).unwrap();

        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/kpis")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
