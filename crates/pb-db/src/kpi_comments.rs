//! KPI comment repository

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::KpiComment;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// KPI comment database entity
#[derive(Debug, Clone, FromRow)]
pub struct KpiCommentRow {
    pub id: i64,
    pub kpi_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl KpiCommentRow {
    pub fn into_model(self) -> KpiComment {
        KpiComment {
            id: Some(self.id),
            kpi_id: self.kpi_id,
            author_id: self.author_id,
            body: self.body,
            created_at: Some(self.created_at),
        }
    }
}

/// DTO for creating a comment
#[derive(Debug, Clone)]
pub struct CreateKpiCommentDto {
    pub kpi_id: Id,
    pub author_id: Id,
    pub body: String,
}

/// KPI comment repository implementation
pub struct KpiCommentRepository {
    pool: PgPool,
}

impl KpiCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateKpiCommentDto) -> RepositoryResult<KpiCommentRow> {
        let row = sqlx::query_as::<_, KpiCommentRow>(
            r#"
            INSERT INTO kpi_comments (kpi_id, author_id, body, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, kpi_id, author_id, body, created_at
            "#,
        )
        .bind(dto.kpi_id)
        .bind(dto.author_id)
        .bind(&dto.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Comments on a KPI, oldest first
    pub async fn find_by_kpi(&self, kpi_id: Id) -> RepositoryResult<Vec<KpiCommentRow>> {
        let rows = sqlx::query_as::<_, KpiCommentRow>(
            r#"
            SELECT id, kpi_id, author_id, body, created_at
            FROM kpi_comments
            WHERE kpi_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(kpi_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM kpi_comments WHERE id = $1")
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
