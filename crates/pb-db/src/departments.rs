//! Department repository

use async_trait::async_trait;
use pb_core::traits::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Department database entity
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
}

/// DTO for creating a department
#[derive(Debug, Clone)]
pub struct CreateDepartmentDto {
    pub name: String,
}

/// DTO for updating a department
#[derive(Debug, Clone, Default)]
pub struct UpdateDepartmentDto {
    pub name: Option<String>,
}

/// Department repository implementation
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department by name
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<DepartmentRow>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name FROM departments WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Check if name is unique
    pub async fn is_name_unique(
        &self,
        name: &str,
        exclude_id: Option<Id>,
    ) -> RepositoryResult<bool> {
        let query = match exclude_id {
            Some(id) => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM departments WHERE LOWER(name) = LOWER($1) AND id != $2)",
            )
            .bind(name)
            .bind(id),
            None => sqlx::query_scalar::<_, bool>(
                "SELECT NOT EXISTS(SELECT 1 FROM departments WHERE LOWER(name) = LOWER($1))",
            )
            .bind(name),
        };

        let unique = query.fetch_one(&self.pool).await?;
        Ok(unique)
    }
}

#[async_trait]
impl Repository<DepartmentRow, CreateDepartmentDto, UpdateDepartmentDto> for DepartmentRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<DepartmentRow>> {
        let row =
            sqlx::query_as::<_, DepartmentRow>("SELECT id, name FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<DepartmentRow>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name FROM departments ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateDepartmentDto) -> RepositoryResult<DepartmentRow> {
        if !self.is_name_unique(&dto.name, None).await? {
            return Err(RepositoryError::Conflict(
                "Department name has already been taken".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, DepartmentRow>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateDepartmentDto) -> RepositoryResult<DepartmentRow> {
        if let Some(ref name) = dto.name {
            if !self.is_name_unique(name, Some(id)).await? {
                return Err(RepositoryError::Conflict(
                    "Department name has already been taken".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<_, DepartmentRow>(
            r#"
            UPDATE departments SET name = COALESCE($1, name)
            WHERE id = $2
            RETURNING id, name
            "#,
        )
        .bind(&dto.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Department with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        // Departments with members cannot be removed
        let has_members = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE department_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_members {
            return Err(RepositoryError::Conflict(
                "Cannot delete department: profiles are assigned to it".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Department with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
