// src/db/alert_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{common::error::AppError, models::alert::Alert};

#[derive(Clone)]
pub struct AlertRepository {
    pool: SqlitePool,
}

impl AlertRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self, resolved: Option<bool>) -> Result<Vec<Alert>, AppError> {
        let alerts = if let Some(resolved) = resolved {
            sqlx::query_as::<_, Alert>(
                "SELECT * FROM alerts WHERE resolved = ? ORDER BY created_at DESC",
            )
            .bind(resolved)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Alert>("SELECT * FROM alerts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(alerts)
    }

    // La invariante "una sola alerta sin resolver por producto" se apoya
    // en esta consulta dentro de la transacción del retiro.
    pub async fn find_unresolved_for_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Option<Alert>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let alert = sqlx::query_as::<_, Alert>(
            "SELECT * FROM alerts WHERE product_id = ? AND resolved = 0 LIMIT 1",
        )
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(alert)
    }

    pub async fn insert<'e, E>(&self, executor: E, alert: &Alert) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO alerts (id, product_id, type, message, resolved, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(alert.id)
        .bind(alert.product_id)
        .bind(alert.alert_type)
        .bind(&alert.message)
        .bind(alert.resolved)
        .bind(alert.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn resolve<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE alerts SET resolved = 1 WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
