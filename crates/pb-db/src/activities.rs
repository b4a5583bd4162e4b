//! Activity repository
//!
//! Logged work-time blocks used for calendars and time reporting.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use pb_core::traits::Id;
use pb_models::Activity;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Activity database entity
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub category_id: i64,
    pub user_id: i64,
}

impl ActivityRow {
    pub fn into_model(self) -> Activity {
        Activity {
            id: Some(self.id),
            title: self.title,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
            category_id: self.category_id,
            user_id: self.user_id,
        }
    }
}

/// DTO for creating an activity
#[derive(Debug, Clone)]
pub struct CreateActivityDto {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub category_id: Id,
    pub user_id: Id,
}

/// DTO for updating an activity
#[derive(Debug, Clone, Default)]
pub struct UpdateActivityDto {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub category_id: Option<Id>,
}

/// Activity repository implementation
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Activities for a user within an inclusive date range
    pub async fn find_by_user_between(
        &self,
        user_id: Id,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<ActivityRow>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, title, date, start_time, end_time, duration_minutes,
                   category_id, user_id
            FROM activities
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC, start_time ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All activities within an inclusive date range, for reporting
    pub async fn find_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<ActivityRow>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, title, date, start_time, end_time, duration_minutes,
                   category_id, user_id
            FROM activities
            WHERE date >= $1 AND date <= $2
            ORDER BY date ASC, start_time ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl Repository<ActivityRow, CreateActivityDto, UpdateActivityDto> for ActivityRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ActivityRow>> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, title, date, start_time, end_time, duration_minutes,
                   category_id, user_id
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<ActivityRow>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, title, date, start_time, end_time, duration_minutes,
                   category_id, user_id
            FROM activities
            ORDER BY date DESC, start_time DESC
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
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateActivityDto) -> RepositoryResult<ActivityRow> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            INSERT INTO activities (
                title, date, start_time, end_time, duration_minutes, category_id, user_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7
            )
            RETURNING id, title, date, start_time, end_time, duration_minutes,
                      category_id, user_id
            "#,
        )
        .bind(&dto.title)
        .bind(dto.date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.duration_minutes)
        .bind(dto.category_id)
        .bind(dto.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateActivityDto) -> RepositoryResult<ActivityRow> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            UPDATE activities SET
                title = COALESCE($1, title),
                date = COALESCE($2, date),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                duration_minutes = COALESCE($5, duration_minutes),
                category_id = COALESCE($6, category_id)
            WHERE id = $7
            RETURNING id, title, date, start_time, end_time, duration_minutes,
                      category_id, user_id
            "#,
        )
        .bind(&dto.title)
        .bind(dto.date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.duration_minutes)
        .bind(dto.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Activity with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Activity with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM activities WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
