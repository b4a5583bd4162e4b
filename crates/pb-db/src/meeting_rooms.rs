//! Meeting room repository

use async_trait::async_trait;
use pb_core::traits::Id;
use pb_models::MeetingRoom;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Meeting room database entity
#[derive(Debug, Clone, FromRow)]
pub struct MeetingRoomRow {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub responsible_id: Option<i64>,
}

impl MeetingRoomRow {
    pub fn into_model(self) -> MeetingRoom {
        MeetingRoom {
            id: Some(self.id),
            name: self.name,
            capacity: self.capacity,
            location: self.location,
            responsible_id: self.responsible_id,
        }
    }
}

/// DTO for creating a meeting room
#[derive(Debug, Clone)]
pub struct CreateMeetingRoomDto {
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub responsible_id: Option<Id>,
}

/// DTO for updating a meeting room
#[derive(Debug, Clone, Default)]
pub struct UpdateMeetingRoomDto {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub responsible_id: Option<Id>,
}

/// Meeting room repository implementation
pub struct MeetingRoomRepository {
    pool: PgPool,
}

impl MeetingRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rooms with at least the requested capacity
    pub async fn find_with_capacity(&self, capacity: i32) -> RepositoryResult<Vec<MeetingRoomRow>> {
        let rows = sqlx::query_as::<_, MeetingRoomRow>(
            r#"
            SELECT id, name, capacity, location, responsible_id
            FROM meeting_rooms
            WHERE capacity >= $1
            ORDER BY capacity ASC, name ASC
            "#,
        )
        .bind(capacity)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl Repository<MeetingRoomRow, CreateMeetingRoomDto, UpdateMeetingRoomDto>
    for MeetingRoomRepository
{
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<MeetingRoomRow>> {
        let row = sqlx::query_as::<_, MeetingRoomRow>(
            "SELECT id, name, capacity, location, responsible_id FROM meeting_rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<MeetingRoomRow>> {
        let rows = sqlx::query_as::<_, MeetingRoomRow>(
            r#"
            SELECT id, name, capacity, location, responsible_id
            FROM meeting_rooms
            ORDER BY name ASC
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
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meeting_rooms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateMeetingRoomDto) -> RepositoryResult<MeetingRoomRow> {
        let row = sqlx::query_as::<_, MeetingRoomRow>(
            r#"
            INSERT INTO meeting_rooms (name, capacity, location, responsible_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, capacity, location, responsible_id
            "#,
        )
        .bind(&dto.name)
        .bind(dto.capacity)
        .bind(&dto.location)
        .bind(dto.responsible_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateMeetingRoomDto) -> RepositoryResult<MeetingRoomRow> {
        let row = sqlx::query_as::<_, MeetingRoomRow>(
            r#"
            UPDATE meeting_rooms SET
                name = COALESCE($1, name),
                capacity = COALESCE($2, capacity),
                location = COALESCE($3, location),
                responsible_id = COALESCE($4, responsible_id)
            WHERE id = $5
            RETURNING id, name, capacity, location, responsible_id
            "#,
        )
        .bind(&dto.name)
        .bind(dto.capacity)
        .bind(&dto.location)
        .bind(dto.responsible_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Room with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let has_reservations = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE room_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_reservations {
            return Err(RepositoryError::Conflict(
                "Cannot delete room: reservations exist for it".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM meeting_rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Room with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM meeting_rooms WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
