//! Ticket comment repository

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::TicketComment;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Ticket comment database entity
#[derive(Debug, Clone, FromRow)]
pub struct TicketCommentRow {
    pub id: i64,
    pub ticket_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl TicketCommentRow {
    pub fn into_model(self) -> TicketComment {
        TicketComment {
            id: Some(self.id),
            ticket_id: self.ticket_id,
            author_id: self.author_id,
            body: self.body,
            created_at: Some(self.created_at),
        }
    }
}

/// DTO for creating a comment
#[derive(Debug, Clone)]
pub struct CreateTicketCommentDto {
    pub ticket_id: Id,
    pub author_id: Id,
    pub body: String,
}

/// Ticket comment repository implementation
pub struct TicketCommentRepository {
    pool: PgPool,
}

impl TicketCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateTicketCommentDto) -> RepositoryResult<TicketCommentRow> {
        let row = sqlx::query_as::<_, TicketCommentRow>(
            r#"
            INSERT INTO ticket_comments (ticket_id, author_id, body, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, ticket_id, author_id, body, created_at
            "#,
        )
        .bind(dto.ticket_id)
        .bind(dto.author_id)
        .bind(&dto.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Comments on a ticket, oldest first
    pub async fn find_by_ticket(&self, ticket_id: Id) -> RepositoryResult<Vec<TicketCommentRow>> {
        let rows = sqlx::query_as::<_, TicketCommentRow>(
            r#"
            SELECT id, ticket_id, author_id, body, created_at
            FROM ticket_comments
            WHERE ticket_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM ticket_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Comment with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
