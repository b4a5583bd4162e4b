//! Notification repository

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, PaginatedResult, RepositoryError, RepositoryResult};

/// Notification database entity
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotificationDto {
    pub user_id: Id,
    pub category: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Notification repository implementation
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateNotificationDto) -> RepositoryResult<NotificationRow> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (
                user_id, category, priority, title, message, is_read, link, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, false, $6, NOW()
            )
            RETURNING id, user_id, category, priority, title, message, is_read, link, created_at
            "#,
        )
        .bind(dto.user_id)
        .bind(&dto.category)
        .bind(&dto.priority)
        .bind(&dto.title)
        .bind(&dto.message)
        .bind(&dto.link)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Notifications for a user, newest first
    pub async fn find_for_user(
        &self,
        user_id: Id,
        unread_only: bool,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<NotificationRow>> {
        let items = if unread_only {
            sqlx::query_as::<_, NotificationRow>(
                r#"
                SELECT id, user_id, category, priority, title, message, is_read, link, created_at
                FROM notifications
                WHERE user_id = $1 AND is_read = false
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(user_id)
            .bind(pagination.limit)
            .bind(pagination.offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, NotificationRow>(
                r#"
                SELECT id, user_id, category, priority, title, message, is_read, link, created_at
                FROM notifications
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(user_id)
            .bind(pagination.limit)
            .bind(pagination.offset)
            .fetch_all(&self.pool)
            .await?
        };

        let total = if unread_only {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
        };

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Count of unread notifications for a user
    pub async fn unread_count(&self, user_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification read; scoped to the owner
    pub async fn mark_read(&self, id: Id, user_id: Id) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Notification with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Mark all of a user's notifications read
    pub async fn mark_all_read(&self, user_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Id, user_id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Notification with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
