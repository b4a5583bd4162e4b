//! User role repository
//!
//! One row per (user, role) pair; grants are idempotent.

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

/// User role database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub user_id: i64,
    pub role: String,
    pub granted_at: DateTime<Utc>,
}

/// User role repository implementation
pub struct UserRoleRepository {
    pool: PgPool,
}

impl UserRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grant a role. Granting an already-held role is a no-op.
    pub async fn grant(&self, user_id: Id, role: &str) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role, granted_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Revoke a role. Revoking a role the user does not hold is a no-op.
    pub async fn revoke(&self, user_id: Id, role: &str) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All roles held by a user
    pub async fn roles_for_user(&self, user_id: Id) -> RepositoryResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// All user ids holding a role
    pub async fn users_with_role(&self, role: &str) -> RepositoryResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM user_roles WHERE role = $1 ORDER BY user_id ASC",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Check whether a user holds a role
    pub async fn has_role(&self, user_id: Id, role: &str) -> RepositoryResult<bool> {
        let held = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(held)
    }
}
