//! Profile repository
//!
//! Database operations for user profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::Profile;
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, PaginatedResult, Repository, RepositoryError, RepositoryResult};

/// Profile database entity
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub department_id: Option<i64>,
    pub active: bool,
    pub hashed_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn into_model(self) -> Profile {
        Profile {
            id: Some(self.id),
            email: self.email,
            name: self.name,
            department_id: self.department_id,
            active: self.active,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// DTO for creating a profile
#[derive(Debug, Clone)]
pub struct CreateProfileDto {
    pub email: String,
    pub name: String,
    pub department_id: Option<Id>,
    pub hashed_password: Option<String>,
}

/// DTO for updating a profile
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub email: Option<String>,
    pub name: Option<String>,
    pub department_id: Option<Id>,
    pub active: Option<bool>,
    pub hashed_password: Option<String>,
}

/// Profile repository implementation
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by email
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, name, department_id, active, hashed_password,
                   created_at, updated_at
            FROM profiles
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find active profiles
    pub async fn find_active(
        &self,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<ProfileRow>> {
        let items = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, name, department_id, active, hashed_password,
                   created_at, updated_at
            FROM profiles
            WHERE active = true
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE active = true")
                .fetch_one(&self.pool)
                .await?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    /// Find profiles in a department
    pub async fn find_by_department(&self, department_id: Id) -> RepositoryResult<Vec<ProfileRow>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, name, department_id, active, hashed_password,
                   created_at, updated_at
            FROM profiles
            WHERE department_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Mark a profile inactive
    pub async fn deactivate(&self, id: Id) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE profiles SET active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Profile with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Check if email is unique
    pub async fn is_email_unique(
        &self,
        email: &str,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<bool> {
        let query = match exclude_id {
            Some(id) => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM profiles WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id),
            None => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM profiles WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email),
        };

        let unique = query.fetch_one(&self.pool).await?;
        Ok(unique)
    }
}

#[async_trait]
impl Repository<ProfileRow, CreateProfileDto, UpdateProfileDto> for ProfileRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, name, department_id, active, hashed_password,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<ProfileRow>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, name, department_id, active, hashed_password,
                   created_at, updated_at
            FROM profiles
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
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateProfileDto) -> RepositoryResult<ProfileRow> {
        if !self.is_email_unique(&dto.email, None).await? {
            return Err(RepositoryError::Conflict(
                "Email has already been taken".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (
                email, name, department_id, active, hashed_password, created_at, updated_at
            ) VALUES (
                $1, $2, $3, true, $4, NOW(), NOW()
            )
            RETURNING id, email, name, department_id, active, hashed_password,
                      created_at, updated_at
            "#,
        )
        .bind(&dto.email)
        .bind(&dto.name)
        .bind(dto.department_id)
        .bind(&dto.hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateProfileDto) -> RepositoryResult<ProfileRow> {
        if let Some(ref email) = dto.email {
            if !self.is_email_unique(email, Some(id)).await? {
                return Err(RepositoryError::Conflict(
                    "Email has already been taken".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles SET
                email = COALESCE($1, email),
                name = COALESCE($2, name),
                department_id = COALESCE($3, department_id),
                active = COALESCE($4, active),
                hashed_password = COALESCE($5, hashed_password),
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, email, name, department_id, active, hashed_password,
                      created_at, updated_at
            "#,
        )
        .bind(&dto.email)
        .bind(&dto.name)
        .bind(dto.department_id)
        .bind(dto.active)
        .bind(&dto.hashed_password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Profile with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Profile with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
