// src/db/user_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Credential, User},
};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Lecturas (pool principal)
    // ---

    pub async fn list_approved(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE approved = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn list_pending(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE approved = 0 ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // ---
    // Operaciones transaccionales (executor genérico)
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email<'e, E>(
        &self,
        executor: E,
        email: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn insert_user<'e, E>(&self, executor: E, user: &User) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, branch_id, approved, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.branch_id)
        .bind(user.approved)
        .bind(user.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_user<'e, E>(&self, executor: E, user: &User) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "UPDATE users SET name = ?, role = ?, branch_id = ?, approved = ? WHERE id = ?",
        )
        .bind(&user.name)
        .bind(user.role)
        .bind(user.branch_id)
        .bind(user.approved)
        .bind(user.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Credenciales
    // ---

    pub async fn find_credential_by_user(&self, user_id: Uuid) -> Result<Option<Credential>, AppError> {
        let credential =
            sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(credential)
    }

    pub async fn insert_credential<'e, E>(
        &self,
        executor: E,
        credential: &Credential,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO credentials (id, user_id, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(credential.id)
        .bind(credential.user_id)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Borrar un usuario revoca sus credenciales en la misma transacción.
    pub async fn delete_credentials_for_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM credentials WHERE user_id = ?")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
