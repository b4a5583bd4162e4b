//! Reservation repository
//!
//! Conflict decisions are made in memory by the domain layer
//! (`pb_models::meeting::conflicts_with`); this repository only fetches
//! the candidate rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use pb_core::traits::Id;
use pb_models::{Reservation, ReservationStatus};
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, PaginatedResult, Repository, RepositoryError, RepositoryResult};

/// Reservation database entity
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub id: i64,
    pub room_id: i64,
    pub requested_by: i64,
    pub approved_by: Option<i64>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReservationRow {
    pub fn into_model(self) -> Reservation {
        Reservation {
            id: Some(self.id),
            room_id: self.room_id,
            requested_by: self.requested_by,
            approved_by: self.approved_by,
            start_time: self.start_time,
            end_time: self.end_time,
            status: ReservationStatus::parse(&self.status).unwrap_or_default(),
            notes: self.notes,
            created_at: Some(self.created_at),
        }
    }
}

/// DTO for creating a reservation
#[derive(Debug, Clone)]
pub struct CreateReservationDto {
    pub room_id: Id,
    pub requested_by: Id,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub notes: Option<String>,
}

/// DTO for updating a reservation
#[derive(Debug, Clone, Default)]
pub struct UpdateReservationDto {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// Reservation repository implementation
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Non-rejected reservations for a room; the conflict-check input set
    pub async fn find_blocking_for_room(&self, room_id: Id) -> RepositoryResult<Vec<ReservationRow>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, room_id, requested_by, approved_by, start_time, end_time,
                   status, notes, created_at
            FROM reservations
            WHERE room_id = $1 AND status != 'rejected'
            ORDER BY start_time ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All reservations for a room
    pub async fn find_by_room(
        &self,
        room_id: Id,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<ReservationRow>> {
        let items = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, room_id, requested_by, approved_by, start_time, end_time,
                   status, notes, created_at
            FROM reservations
            WHERE room_id = $1
            ORDER BY start_time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Reservations requested by a user
    pub async fn find_by_requester(&self, user_id: Id) -> RepositoryResult<Vec<ReservationRow>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, room_id, requested_by, approved_by, start_time, end_time,
                   status, notes, created_at
            FROM reservations
            WHERE requested_by = $1
            ORDER BY start_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Move a reservation through its approval workflow
    pub async fn set_status(
        &self,
        id: Id,
        status: &str,
        approved_by: Option<Id>,
    ) -> RepositoryResult<ReservationRow> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET status = $1, approved_by = $2
            WHERE id = $3
            RETURNING id, room_id, requested_by, approved_by, start_time, end_time,
                      status, notes, created_at
            "#,
        )
        .bind(status)
        .bind(approved_by)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Reservation with id {} not found", id)))?;

        Ok(row)
    }
}

#[async_trait]
impl Repository<ReservationRow, CreateReservationDto, UpdateReservationDto>
    for ReservationRepository
{
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ReservationRow>> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, room_id, requested_by, approved_by, start_time, end_time,
                   status, notes, created_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<ReservationRow>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, room_id, requested_by, approved_by, start_time, end_time,
                   status, notes, created_at
            FROM reservations
            ORDER BY start_time DESC
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
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateReservationDto) -> RepositoryResult<ReservationRow> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            INSERT INTO reservations (
                room_id, requested_by, start_time, end_time, status, notes, created_at
            ) VALUES (
                $1, $2, $3, $4, 'pending', $5, NOW()
            )
            RETURNING id, room_id, requested_by, approved_by, start_time, end_time,
                      status, notes, created_at
            "#,
        )
        .bind(dto.room_id)
        .bind(dto.requested_by)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateReservationDto) -> RepositoryResult<ReservationRow> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET
                start_time = COALESCE($1, start_time),
                end_time = COALESCE($2, end_time),
                notes = COALESCE($3, notes)
            WHERE id = $4
            RETURNING id, room_id, requested_by, approved_by, start_time, end_time,
                      status, notes, created_at
            "#,
        )
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Reservation with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Reservation with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM reservations WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
