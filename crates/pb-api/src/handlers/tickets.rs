//! Ticket API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{
    CreateNotificationDto, CreateTicketCommentDto, CreateTicketDto, NotificationRepository,
    Repository, TicketCommentRepository, TicketRepository, TicketRow, UpdateTicketDto,
};
use pb_models::{Priority, TicketStatus};
use pb_services::tickets::{CreateTicketService, TicketParams, TransitionTicketService};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    priority: String,
    status: String,
    source_department_id: Id,
    target_department_id: Id,
    created_by: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_to: Option<Id>,
    created_at: String,
    updated_at: String,
    #[serde(rename = "_links")]
    links: TicketLinks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketLinks {
    #[serde(rename = "self")]
    self_link: Link,
    comments: Link,
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

impl TicketResponse {
    fn from_row(row: TicketRow) -> Self {
        Self {
            type_name: "Ticket",
            id: row.id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            status: row.status,
            source_department_id: row.source_department_id,
            target_department_id: row.target_department_id,
            created_by: row.created_by,
            assigned_to: row.assigned_to,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
            links: TicketLinks {
                self_link: Link {
                    href: format!("/api/v1/tickets/{}", row.id),
                },
                comments: Link {
                    href: format!("/api/v1/tickets/{}/comments", row.id),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilters {
    pub target_department_id: Option<Id>,
    pub assigned_to: Option<Id>,
}

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<TicketFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());
    let db_pagination = pb_db::Pagination::new(pagination.limit(), pagination.offset());

    let (rows, total) = if let Some(department_id) = filters.target_department_id {
        let result = repo
            .find_by_target_department(department_id, db_pagination)
            .await
            .map_err(|e| ApiError::from_repository("Ticket", e))?;
        (result.items, result.total)
    } else if let Some(assignee) = filters.assigned_to {
        let result = repo
            .find_by_assignee(assignee, db_pagination)
            .await
            .map_err(|e| ApiError::from_repository("Ticket", e))?;
        (result.items, result.total)
    } else {
        let rows = repo
            .find_all(pagination.limit(), pagination.offset())
            .await
            .map_err(|e| ApiError::from_repository("Ticket", e))?;
        let total = repo
            .count()
            .await
            .map_err(|e| ApiError::from_repository("Ticket", e))?;
        (rows, total)
    };

    let elements: Vec<TicketResponse> = rows.into_iter().map(TicketResponse::from_row).collect();
    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .ok_or_else(|| ApiError::not_found("Ticket", id))?;

    Ok(HalResponse(TicketResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
    pub source_department_id: Id,
    pub target_department_id: Id,
    #[serde(default)]
    pub assigned_to: Option<Id>,
}

/// POST /api/v1/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());

    let priority = Priority::parse(&request.priority)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown priority: {}", request.priority)))?;

    let service = CreateTicketService::new(&*user);
    let validated = service
        .call(TicketParams {
            title: request.title,
            description: request.description,
            priority,
            source_department_id: request.source_department_id,
            target_department_id: request.target_department_id,
            assigned_to: request.assigned_to,
        })
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let row = repo
        .create(CreateTicketDto {
            title: validated.title.clone(),
            description: validated.description.clone(),
            priority: validated.priority.as_str().to_string(),
            source_department_id: validated.source_department_id,
            target_department_id: validated.target_department_id,
            created_by: validated.created_by,
            assigned_to: validated.assigned_to,
        })
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?;

    if let Some(assignee) = row.assigned_to {
        notify_assignee(&state, assignee, row.id, &row.title).await?;
    }

    Ok((StatusCode::CREATED, HalResponse(TicketResponse::from_row(row))))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub target_department_id: Option<Id>,
    pub assigned_to: Option<Id>,
}

/// PATCH /api/v1/tickets/:id
pub async fn update_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateTicketRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());

    let existing = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .ok_or_else(|| ApiError::not_found("Ticket", id))?;

    let allowed = user.is_admin()
        || existing.created_by == user.id
        || existing.assigned_to == Some(user.id)
        || user.can_manage_department(existing.target_department_id);
    if !allowed {
        return Err(ApiError::forbidden("You may not edit this ticket"));
    }

    if let Some(ref priority) = request.priority {
        Priority::parse(priority)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown priority: {}", priority)))?;
    }

    let newly_assigned = request
        .assigned_to
        .filter(|assignee| existing.assigned_to != Some(*assignee));

    let row = repo
        .update(
            id,
            UpdateTicketDto {
                title: request.title,
                description: request.description,
                priority: request.priority,
                status: None,
                target_department_id: request.target_department_id,
                assigned_to: request.assigned_to,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?;

    if let Some(assignee) = newly_assigned {
        notify_assignee(&state, assignee, row.id, &row.title).await?;
    }

    Ok(HalResponse(TicketResponse::from_row(row)))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// POST /api/v1/tickets/:id/status
pub async fn transition_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());

    let status = TicketStatus::parse(&request.status)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {}", request.status)))?;

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .ok_or_else(|| ApiError::not_found("Ticket", id))?;

    let service = TransitionTicketService::new(&*user);
    let updated = service
        .call(row.into_model(), status)
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let row = repo
        .update_status(id, updated.status.as_str())
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?;

    Ok(HalResponse(TicketResponse::from_row(row)))
}

/// DELETE /api/v1/tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = TicketRepository::new(pool.clone());

    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .ok_or_else(|| ApiError::not_found("Ticket", id))?;

    if !user.is_admin() && row.created_by != user.id {
        return Err(ApiError::forbidden("Only the submitter or an administrator can delete a ticket"));
    }

    repo.delete(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    ticket_id: Id,
    author_id: Id,
    body: String,
    created_at: String,
}

/// GET /api/v1/tickets/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;

    let rows = TicketCommentRepository::new(pool.clone())
        .find_by_ticket(id)
        .await
        .map_err(|e| ApiError::from_repository("TicketComment", e))?;

    let elements: Vec<CommentResponse> = rows
        .into_iter()
        .map(|row| CommentResponse {
            type_name: "TicketComment",
            id: row.id,
            ticket_id: row.ticket_id,
            author_id: row.author_id,
            body: row.body,
            created_at: row.created_at.to_rfc3339(),
        })
        .collect();

    let total = elements.len() as i64;
    Ok(HalResponse(CollectionResponse::new(
        elements,
        total,
        pb_core::pagination::PaginationParams::new(total.max(1), 0),
    )))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

/// POST /api/v1/tickets/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.body.trim().is_empty() {
        return Err(ApiError::bad_request("Comment body can't be blank"));
    }

    let pool = state.pool()?;
    let tickets = TicketRepository::new(pool.clone());
    tickets
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("Ticket", e))?
        .ok_or_else(|| ApiError::not_found("Ticket", id))?;

    let row = TicketCommentRepository::new(pool.clone())
        .create(CreateTicketCommentDto {
            ticket_id: id,
            author_id: user.id,
            body: request.body,
        })
        .await
        .map_err(|e| ApiError::from_repository("TicketComment", e))?;

    Ok((
        StatusCode::CREATED,
        HalResponse(CommentResponse {
            type_name: "TicketComment",
            id: row.id,
            ticket_id: row.ticket_id,
            author_id: row.author_id,
            body: row.body,
            created_at: row.created_at.to_rfc3339(),
        }),
    ))
}

async fn notify_assignee(
    state: &AppState,
    assignee: Id,
    ticket_id: Id,
    title: &str,
) -> ApiResult<()> {
    let pool = state.pool()?;
    let note = pb_notifications::Notification::ticket_assigned(assignee, ticket_id, title);

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

    Ok(())
}
