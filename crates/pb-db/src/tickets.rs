//! Ticket repository
//!
//! Database operations for cross-department tickets.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::{Priority, Ticket, TicketStatus};
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, PaginatedResult, Repository, RepositoryError, RepositoryResult};

/// Ticket database entity
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub source_department_id: i64,
    pub target_department_id: i64,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketRow {
    pub fn into_model(self) -> Ticket {
        Ticket {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            priority: Priority::parse(&self.priority).unwrap_or_default(),
            status: TicketStatus::parse(&self.status).unwrap_or_default(),
            source_department_id: self.source_department_id,
            target_department_id: self.target_department_id,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// DTO for creating a ticket
#[derive(Debug, Clone)]
pub struct CreateTicketDto {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub source_department_id: Id,
    pub target_department_id: Id,
    pub created_by: Id,
    pub assigned_to: Option<Id>,
}

/// DTO for updating a ticket
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub target_department_id: Option<Id>,
    pub assigned_to: Option<Id>,
}

/// Ticket repository implementation
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find tickets routed to a department
    pub async fn find_by_target_department(
        &self,
        department_id: Id,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<TicketRow>> {
        let items = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, priority, status, source_department_id,
                   target_department_id, created_by, assigned_to, created_at, updated_at
            FROM tickets
            WHERE target_department_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(department_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE target_department_id = $1",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Find tickets assigned to a user
    pub async fn find_by_assignee(
        &self,
        user_id: Id,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<TicketRow>> {
        let items = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, priority, status, source_department_id,
                   target_department_id, created_by, assigned_to, created_at, updated_at
            FROM tickets
            WHERE assigned_to = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE assigned_to = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Change ticket status
    pub async fn update_status(&self, id: Id, status: &str) -> RepositoryResult<TicketRow> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, title, description, priority, status, source_department_id,
                      target_department_id, created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Ticket with id {} not found", id)))?;

        Ok(row)
    }

    /// Reassign a user's open tickets (profile deactivation)
    pub async fn transfer_open_tickets(&self, from: Id, to: Id) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tickets SET assigned_to = $1, updated_at = NOW()
            WHERE assigned_to = $2 AND status IN ('open', 'in_progress')
            "#,
        )
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// All tickets, unpaginated, for reporting
    pub async fn find_all_for_report(&self) -> RepositoryResult<Vec<TicketRow>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, priority, status, source_department_id,
                   target_department_id, created_by, assigned_to, created_at, updated_at
            FROM tickets
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl Repository<TicketRow, CreateTicketDto, UpdateTicketDto> for TicketRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TicketRow>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, priority, status, source_department_id,
                   target_department_id, created_by, assigned_to, created_at, updated_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<TicketRow>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, priority, status, source_department_id,
                   target_department_id, created_by, assigned_to, created_at, updated_at
            FROM tickets
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateTicketDto) -> RepositoryResult<TicketRow> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (
                title, description, priority, status, source_department_id,
                target_department_id, created_by, assigned_to, created_at, updated_at
            ) VALUES (
                $1, $2, $3, 'open', $4, $5, $6, $7, NOW(), NOW()
            )
            RETURNING id, title, description, priority, status, source_department_id,
                      target_department_id, created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.priority)
        .bind(dto.source_department_id)
        .bind(dto.target_department_id)
        .bind(dto.created_by)
        .bind(dto.assigned_to)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateTicketDto) -> RepositoryResult<TicketRow> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                priority = COALESCE($3, priority),
                status = COALESCE($4, status),
                target_department_id = COALESCE($5, target_department_id),
                assigned_to = COALESCE($6, assigned_to),
                updated_at = NOW()
            WHERE id = $7
            RETURNING id, title, description, priority, status, source_department_id,
                      target_department_id, created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.priority)
        .bind(&dto.status)
        .bind(dto.target_department_id)
        .bind(dto.assigned_to)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Ticket with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Ticket with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tickets WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
