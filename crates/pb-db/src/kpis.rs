//! KPI target repository
//!
//! Database operations for KPI targets and their assignee lists.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pb_core::traits::Id;
use pb_models::{KpiPeriod, KpiStatus, KpiTarget, Priority};
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, PaginatedResult, Repository, RepositoryError, RepositoryResult};

/// KPI target database entity
#[derive(Debug, Clone, FromRow)]
pub struct KpiTargetRow {
    pub id: i64,
    pub title: String,
    pub department_id: i64,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: String,
    pub priority: String,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KpiTargetRow {
    /// Convert to the domain model; unknown enum strings fall back to defaults
    pub fn into_model(self, assignee_ids: Vec<Id>) -> KpiTarget {
        KpiTarget {
            id: Some(self.id),
            title: self.title,
            department_id: self.department_id,
            target_value: self.target_value,
            current_value: self.current_value,
            unit: self.unit,
            start_date: self.start_date,
            end_date: self.end_date,
            period: KpiPeriod::parse(&self.period).unwrap_or_default(),
            priority: Priority::parse(&self.priority).unwrap_or_default(),
            status: KpiStatus::parse(&self.status).unwrap_or_default(),
            created_by: self.created_by,
            assignee_ids,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// DTO for creating a KPI target
#[derive(Debug, Clone)]
pub struct CreateKpiDto {
    pub title: String,
    pub department_id: Id,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: String,
    pub priority: String,
    pub created_by: Id,
}

/// DTO for updating a KPI target
#[derive(Debug, Clone, Default)]
pub struct UpdateKpiDto {
    pub title: Option<String>,
    pub department_id: Option<Id>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

/// KPI target repository implementation
pub struct KpiRepository {
    pool: PgPool,
}

impl KpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find KPI targets for a department
    pub async fn find_by_department(
        &self,
        department_id: Id,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<KpiTargetRow>> {
        let items = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            SELECT id, title, department_id, target_value, current_value, unit,
                   start_date, end_date, period, priority, status, created_by,
                   created_at, updated_at
            FROM kpi_targets
            WHERE department_id = $1
            ORDER BY end_date ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(department_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM kpi_targets WHERE department_id = $1",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Find active KPI targets across departments
    pub async fn find_active(&self) -> RepositoryResult<Vec<KpiTargetRow>> {
        let rows = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            SELECT id, title, department_id, target_value, current_value, unit,
                   start_date, end_date, period, priority, status, created_by,
                   created_at, updated_at
            FROM kpi_targets
            WHERE status = 'active'
            ORDER BY end_date ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Reassign ownership of a user's KPI targets (profile deactivation)
    pub async fn transfer_ownership(&self, from: Id, to: Id) -> RepositoryResult<u64> {
        let result = sqlx::query(
            "UPDATE kpi_targets SET created_by = $1, updated_at = NOW() WHERE created_by = $2",
        )
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Assignee user ids for a KPI
    pub async fn assignees(&self, kpi_id: Id) -> RepositoryResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM kpi_assignments WHERE kpi_id = $1 ORDER BY user_id ASC",
        )
        .bind(kpi_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Replace the assignee list for a KPI
    pub async fn set_assignees(&self, kpi_id: Id, user_ids: &[Id]) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM kpi_assignments WHERE kpi_id = $1")
            .bind(kpi_id)
            .execute(&mut *tx)
            .await?;

        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO kpi_assignments (kpi_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (kpi_id, user_id) DO NOTHING
                "#,
            )
            .bind(kpi_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<KpiTargetRow, CreateKpiDto, UpdateKpiDto> for KpiRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<KpiTargetRow>> {
        let row = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            SELECT id, title, department_id, target_value, current_value, unit,
                   start_date, end_date, period, priority, status, created_by,
                   created_at, updated_at
            FROM kpi_targets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<KpiTargetRow>> {
        let rows = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            SELECT id, title, department_id, target_value, current_value, unit,
                   start_date, end_date, period, priority, status, created_by,
                   created_at, updated_at
            FROM kpi_targets
            ORDER BY end_date ASC, id ASC
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
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM kpi_targets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateKpiDto) -> RepositoryResult<KpiTargetRow> {
        let row = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            INSERT INTO kpi_targets (
                title, department_id, target_value, current_value, unit,
                start_date, end_date, period, priority, status, created_by,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', $10, NOW(), NOW()
            )
            RETURNING id, title, department_id, target_value, current_value, unit,
                      start_date, end_date, period, priority, status, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(&dto.title)
        .bind(dto.department_id)
        .bind(dto.target_value)
        .bind(dto.current_value)
        .bind(&dto.unit)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.period)
        .bind(&dto.priority)
        .bind(dto.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateKpiDto) -> RepositoryResult<KpiTargetRow> {
        let row = sqlx::query_as::<_, KpiTargetRow>(
            r#"
            UPDATE kpi_targets SET
                title = COALESCE($1, title),
                department_id = COALESCE($2, department_id),
                target_value = COALESCE($3, target_value),
                current_value = COALESCE($4, current_value),
                unit = COALESCE($5, unit),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                period = COALESCE($8, period),
                priority = COALESCE($9, priority),
                status = COALESCE($10, status),
                updated_at = NOW()
            WHERE id = $11
            RETURNING id, title, department_id, target_value, current_value, unit,
                      start_date, end_date, period, priority, status, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(&dto.title)
        .bind(dto.department_id)
        .bind(dto.target_value)
        .bind(dto.current_value)
        .bind(&dto.unit)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.period)
        .bind(&dto.priority)
        .bind(&dto.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("KPI with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM kpi_targets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "KPI with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM kpi_targets WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
