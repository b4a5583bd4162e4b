//! Activity category repository

use async_trait::async_trait;
use pb_core::traits::Id;
use pb_core::types::Color;
use pb_models::ActivityCategory;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Activity category database entity
#[derive(Debug, Clone, FromRow)]
pub struct ActivityCategoryRow {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl ActivityCategoryRow {
    pub fn into_model(self) -> ActivityCategory {
        ActivityCategory {
            id: Some(self.id),
            name: self.name,
            color: Color::new(self.color),
        }
    }
}

/// DTO for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategoryDto {
    pub name: String,
    pub color: String,
}

/// DTO for updating a category
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryDto {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Activity category repository implementation
pub struct ActivityCategoryRepository {
    pool: PgPool,
}

impl ActivityCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check if name is unique
    pub async fn is_name_unique(
        &self,
        name: &str,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<bool> {
        let query = match exclude_id {
            Some(id) => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM activity_categories WHERE LOWER(name) = LOWER($1) AND id != $2)",
            )
            .bind(name)
            .bind(id),
            None => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM activity_categories WHERE LOWER(name) = LOWER($1))",
            )
            .bind(name),
        };

        let unique = query.fetch_one(&self.pool).await?;
        Ok(unique)
    }
}

#[async_trait]
impl Repository<ActivityCategoryRow, CreateCategoryDto, UpdateCategoryDto>
    for ActivityCategoryRepository
{
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ActivityCategoryRow>> {
        let row = sqlx::query_as::<_, ActivityCategoryRow>(
            "SELECT id, name, color FROM activity_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<ActivityCategoryRow>> {
        let rows = sqlx::query_as::<_, ActivityCategoryRow>(
            "SELECT id, name, color FROM activity_categories ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activity_categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateCategoryDto) -> RepositoryResult<ActivityCategoryRow> {
        if !self.is_name_unique(&dto.name, None).await? {
            return Err(RepositoryError::Conflict(
                "Category name has already been taken".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ActivityCategoryRow>(
            r#"
            INSERT INTO activity_categories (name, color)
            VALUES ($1, $2)
            RETURNING id, name, color
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateCategoryDto) -> RepositoryResult<ActivityCategoryRow> {
        if let Some(ref name) = dto.name {
            if !self.is_name_unique(name, Some(id)).await? {
                return Err(RepositoryError::Conflict(
                    "Category name has already been taken".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<_, ActivityCategoryRow>(
            r#"
            UPDATE activity_categories SET
                name = COALESCE($1, name),
                color = COALESCE($2, color)
            WHERE id = $3
            RETURNING id, name, color
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.color)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Category with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if in_use {
            return Err(RepositoryError::Conflict(
                "Cannot delete category: activities are using it".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM activity_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM activity_categories WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
