//! KPI API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use pb_core::pagination::CollectionResponse;
use pb_core::traits::{Id, UserContext};
use pb_db::{
    CreateKpiCommentDto, CreateKpiDto, CreateNotificationDto, CreateProgressDto,
    KpiCommentRepository, KpiProgressRepository, KpiRepository, KpiTargetRow,
    NotificationRepository, Repository, UpdateKpiDto,
};
use pb_models::{KpiPeriod, KpiSnapshot, KpiStatus, KpiTarget, Priority};
use pb_services::kpis::{CreateKpiService, KpiParams, RecordProgressService};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, HalResponse, Pagination};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    title: String,
    department_id: Id,
    target_value: f64,
    current_value: f64,
    unit: String,
    start_date: String,
    end_date: String,
    period: String,
    priority: String,
    status: String,
    created_by: Id,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    assignee_ids: Vec<Id>,
    snapshot: KpiSnapshot,
    #[serde(rename = "_links")]
    links: KpiLinks,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KpiLinks {
    #[serde(rename = "self")]
    self_link: Link,
    department: Link,
    progress: Link,
    comments: Link,
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

impl KpiResponse {
    fn from_row(row: KpiTargetRow, assignee_ids: Vec<Id>, today: NaiveDate) -> Self {
        let id = row.id;
        let department_id = row.department_id;
        let model = row.into_model(assignee_ids);
        let snapshot = model.snapshot(today);

        Self {
            type_name: "KpiTarget",
            id,
            title: model.title,
            department_id,
            target_value: model.target_value,
            current_value: model.current_value,
            unit: model.unit,
            start_date: model.start_date.to_string(),
            end_date: model.end_date.to_string(),
            period: model.period.as_str().to_string(),
            priority: model.priority.as_str().to_string(),
            status: model.status.as_str().to_string(),
            created_by: model.created_by,
            assignee_ids: model.assignee_ids,
            snapshot,
            links: KpiLinks {
                self_link: Link {
                    href: format!("/api/v1/kpis/{}", id),
                },
                department: Link {
                    href: format!("/api/v1/departments/{}", department_id),
                },
                progress: Link {
                    href: format!("/api/v1/kpis/{}/progress", id),
                },
                comments: Link {
                    href: format!("/api/v1/kpis/{}/comments", id),
                },
            },
        }
    }
}

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD"))
}

async fn load_kpi(
    repo: &KpiRepository,
    id: Id,
) -> ApiResult<(KpiTargetRow, Vec<Id>)> {
    let row = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?
        .ok_or_else(|| ApiError::not_found("KPI", id))?;
    let assignees = repo
        .assignees(id)
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;
    Ok((row, assignees))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KpiFilters {
    pub department_id: Option<Id>,
}

/// GET /api/v1/kpis
pub async fn list_kpis(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
    Query(filters): Query<KpiFilters>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());
    let today = Utc::now().date_naive();

    let (rows, total) = if let Some(department_id) = filters.department_id {
        let result = repo
            .find_by_department(
                department_id,
                pb_db::Pagination::new(pagination.limit(), pagination.offset()),
            )
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?;
        (result.items, result.total)
    } else {
        let rows = repo
            .find_all(pagination.limit(), pagination.offset())
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?;
        let total = repo
            .count()
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?;
        (rows, total)
    };

    let mut elements = Vec::with_capacity(rows.len());
    for row in rows {
        let assignees = repo
            .assignees(row.id)
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?;
        elements.push(KpiResponse::from_row(row, assignees, today));
    }

    Ok(HalResponse(CollectionResponse::new(elements, total, pagination.0)))
}

/// GET /api/v1/kpis/:id
pub async fn get_kpi(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let (row, assignees) = load_kpi(&repo, id).await?;
    Ok(HalResponse(KpiResponse::from_row(
        row,
        assignees,
        Utc::now().date_naive(),
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKpiRequest {
    pub title: String,
    pub department_id: Id,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub unit: String,
    pub start_date: String,
    pub end_date: String,
    pub period: String,
    pub priority: String,
    #[serde(default)]
    pub assignee_ids: Vec<Id>,
}

/// POST /api/v1/kpis
pub async fn create_kpi(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateKpiRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let period = KpiPeriod::parse(&request.period)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown period: {}", request.period)))?;
    let priority = Priority::parse(&request.priority)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown priority: {}", request.priority)))?;

    let service = CreateKpiService::new(&*user);
    let validated = service
        .call(KpiParams {
            title: request.title,
            department_id: request.department_id,
            target_value: request.target_value,
            current_value: request.current_value,
            unit: request.unit,
            start_date: parse_date(&request.start_date)?,
            end_date: parse_date(&request.end_date)?,
            period,
            priority,
            assignee_ids: request.assignee_ids.clone(),
        })
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    let row = repo
        .create(CreateKpiDto {
            title: validated.title.clone(),
            department_id: validated.department_id,
            target_value: validated.target_value,
            current_value: validated.current_value,
            unit: validated.unit.clone(),
            start_date: validated.start_date,
            end_date: validated.end_date,
            period: validated.period.as_str().to_string(),
            priority: validated.priority.as_str().to_string(),
            created_by: validated.created_by,
        })
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    if !request.assignee_ids.is_empty() {
        repo.set_assignees(row.id, &request.assignee_ids)
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?;
    }

    let response = KpiResponse::from_row(row, request.assignee_ids, Utc::now().date_naive());
    Ok((StatusCode::CREATED, HalResponse(response)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKpiRequest {
    pub title: Option<String>,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assignee_ids: Option<Vec<Id>>,
}

/// PATCH /api/v1/kpis/:id
pub async fn update_kpi(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateKpiRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let (row, _) = load_kpi(&repo, id).await?;
    if !user.can_manage_department(row.department_id) {
        return Err(ApiError::forbidden(
            "Only department managers and administrators can manage KPI targets",
        ));
    }

    if let Some(ref period) = request.period {
        KpiPeriod::parse(period)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown period: {}", period)))?;
    }
    if let Some(ref priority) = request.priority {
        Priority::parse(priority)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown priority: {}", priority)))?;
    }
    if let Some(ref status) = request.status {
        KpiStatus::parse(status)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {}", status)))?;
    }

    let start_date = request.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = request.end_date.as_deref().map(parse_date).transpose()?;

    let row = repo
        .update(
            id,
            UpdateKpiDto {
                title: request.title,
                department_id: None,
                target_value: request.target_value,
                current_value: None,
                unit: request.unit,
                start_date,
                end_date,
                period: request.period,
                priority: request.priority,
                status: request.status,
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    let assignees = match request.assignee_ids {
        Some(ids) => {
            repo.set_assignees(id, &ids)
                .await
                .map_err(|e| ApiError::from_repository("KPI", e))?;
            ids
        }
        None => repo
            .assignees(id)
            .await
            .map_err(|e| ApiError::from_repository("KPI", e))?,
    };

    Ok(HalResponse(KpiResponse::from_row(
        row,
        assignees,
        Utc::now().date_naive(),
    )))
}

/// DELETE /api/v1/kpis/:id
pub async fn delete_kpi(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let (row, _) = load_kpi(&repo, id).await?;
    if !user.can_manage_department(row.department_id) {
        return Err(ApiError::forbidden(
            "Only department managers and administrators can manage KPI targets",
        ));
    }

    repo.delete(id)
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Default)]
pub struct SnapshotQuery {
    /// Evaluation day, defaults to today
    pub date: Option<String>,
}

/// GET /api/v1/kpis/:id/snapshot
pub async fn kpi_snapshot(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Query(query): Query<SnapshotQuery>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let today = match query.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => Utc::now().date_naive(),
    };

    let (row, assignees) = load_kpi(&repo, id).await?;
    let snapshot = row.into_model(assignees).snapshot(today);

    Ok(HalResponse(snapshot))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    kpi_id: Id,
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    recorded_at: String,
    recorded_by: Id,
}

/// GET /api/v1/kpis/:id/progress
pub async fn list_progress(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());
    load_kpi(&repo, id).await?;

    let rows = KpiProgressRepository::new(pool.clone())
        .find_by_kpi(id)
        .await
        .map_err(|e| ApiError::from_repository("KpiProgress", e))?;

    let elements: Vec<ProgressResponse> = rows
        .into_iter()
        .map(|row| ProgressResponse {
            type_name: "KpiProgress",
            id: row.id,
            kpi_id: row.kpi_id,
            value: row.value,
            note: row.note,
            recorded_at: row.recorded_at.to_rfc3339(),
            recorded_by: row.recorded_by,
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
#[serde(rename_all = "camelCase")]
pub struct RecordProgressRequest {
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// POST /api/v1/kpis/:id/progress
pub async fn record_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(request): Json<RecordProgressRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());

    let (row, assignees) = load_kpi(&repo, id).await?;
    let model: KpiTarget = row.into_model(assignees.clone());

    let service = RecordProgressService::new(&*user);
    let updated = service
        .call(model, request.value)
        .into_result()
        .map_err(|e| match e {
            pb_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::internal(other.to_string()),
        })?;

    KpiProgressRepository::new(pool.clone())
        .create(CreateProgressDto {
            kpi_id: id,
            value: request.value,
            note: request.note,
            recorded_by: user.id,
        })
        .await
        .map_err(|e| ApiError::from_repository("KpiProgress", e))?;

    let row = repo
        .update(
            id,
            UpdateKpiDto {
                current_value: Some(updated.current_value),
                status: Some(updated.status.as_str().to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| ApiError::from_repository("KPI", e))?;

    Ok((
        StatusCode::CREATED,
        HalResponse(KpiResponse::from_row(row, assignees, Utc::now().date_naive())),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResponse {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: Id,
    kpi_id: Id,
    author_id: Id,
    body: String,
    created_at: String,
}

/// GET /api/v1/kpis/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let pool = state.pool()?;
    let repo = KpiRepository::new(pool.clone());
    load_kpi(&repo, id).await?;

    let rows = KpiCommentRepository::new(pool.clone())
        .find_by_kpi(id)
        .await
        .map_err(|e| ApiError::from_repository("KpiComment", e))?;

    let elements: Vec<CommentResponse> = rows
        .into_iter()
        .map(|row| CommentResponse {
            type_name: "KpiComment",
            id: row.id,
            kpi_id: row.kpi_id,
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

/// POST /api/v1/kpis/:id/comments
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
    let repo = KpiRepository::new(pool.clone());
    let (kpi_row, assignees) = load_kpi(&repo, id).await?;

    let row = KpiCommentRepository::new(pool.clone())
        .create(CreateKpiCommentDto {
            kpi_id: id,
            author_id: user.id,
            body: request.body,
        })
        .await
        .map_err(|e| ApiError::from_repository("KpiComment", e))?;

    // Assignees other than the author hear about new comments
    let notifications = NotificationRepository::new(pool.clone());
    for assignee in assignees.iter().filter(|&&a| a != user.id) {
        let note = pb_notifications::Notification::kpi_commented(*assignee, id, &kpi_row.title);
        notifications
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
    }

    Ok((
        StatusCode::CREATED,
        HalResponse(CommentResponse {
            type_name: "KpiComment",
            id: row.id,
            kpi_id: row.kpi_id,
            author_id: row.author_id,
            body: row.body,
            created_at: row.created_at.to_rfc3339(),
        }),
    ))
}
