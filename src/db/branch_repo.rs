// src/db/branch_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::directory::Branch};

#[derive(Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Branch>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(branch)
    }

    pub async fn insert<'e, E>(&self, executor: E, branch: &Branch) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO branches (id, name, city, location_details, active, manager_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(branch.id)
        .bind(&branch.name)
        .bind(&branch.city)
        .bind(&branch.location_details)
        .bind(branch.active)
        .bind(branch.manager_id)
        .bind(branch.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update<'e, E>(&self, executor: E, branch: &Branch) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE branches
            SET name = ?, city = ?, location_details = ?, active = ?, manager_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&branch.name)
        .bind(&branch.city)
        .bind(&branch.location_details)
        .bind(branch.active)
        .bind(branch.manager_id)
        .bind(branch.id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
