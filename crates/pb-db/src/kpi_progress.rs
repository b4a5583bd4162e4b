//! KPI progress repository
//!
//! Recorded progress values against KPI targets.

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::KpiProgress;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// KPI progress database entity
#[derive(Debug, Clone, FromRow)]
pub struct KpiProgressRow {
    pub id: i64,
    pub kpi_id: i64,
    pub value: f64,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: i64,
}

impl KpiProgressRow {
    pub fn into_model(self) -> KpiProgress {
        KpiProgress {
            id: Some(self.id),
            kpi_id: self.kpi_id,
            value: self.value,
            note: self.note,
            recorded_at: self.recorded_at,
            recorded_by: self.recorded_by,
        }
    }
}

/// DTO for recording progress
#[derive(Debug, Clone)]
pub struct CreateProgressDto {
    pub kpi_id: Id,
    pub value: f64,
    pub note: Option<String>,
    pub recorded_by: Id,
}

/// KPI progress repository implementation
pub struct KpiProgressRepository {
    pool: PgPool,
}

impl KpiProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a progress value
    pub async fn create(&self, dto: CreateProgressDto) -> RepositoryResult<KpiProgressRow> {
        let row = sqlx::query_as::<_, KpiProgressRow>(
            r#"
            INSERT INTO kpi_progress (kpi_id, value, note, recorded_at, recorded_by)
            VALUES ($1, $2, $3, NOW(), $4)
            RETURNING id, kpi_id, value, note, recorded_at, recorded_by
            "#,
        )
        .bind(dto.kpi_id)
        .bind(dto.value)
        .bind(&dto.note)
        .bind(dto.recorded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Progress history for a KPI, newest first
    pub async fn find_by_kpi(&self, kpi_id: Id) -> RepositoryResult<Vec<KpiProgressRow>> {
        let rows = sqlx::query_as::<_, KpiProgressRow>(
            r#"
            SELECT id, kpi_id, value, note, recorded_at, recorded_by
            FROM kpi_progress
            WHERE kpi_id = $1
            ORDER BY recorded_at DESC, id DESC
            "#,
        )
        .bind(kpi_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a recorded value
    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM kpi_progress WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Progress record with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
