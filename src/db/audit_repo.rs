// src/db/audit_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::audit::AuditLogEntry};

#[derive(Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Se llama desde adentro de la transacción de cada mutación, para que
    // la entrada de auditoría caiga junto con el cambio o no caiga.
    pub async fn append<'e, E>(
        &self,
        executor: E,
        user_id: Option<Uuid>,
        action: &str,
        details: &str,
        entity_type: Option<&str>,
        entity_id: Option<String>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, user_id, action, details, entity_type, entity_id, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(entity_type)
        .bind(entity_id)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
