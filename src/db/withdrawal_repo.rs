// src/db/withdrawal_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::withdrawal::{Withdrawal, WithdrawalItem, WithdrawalReason, WithdrawalStatus},
};

#[derive(Clone)]
pub struct WithdrawalRepository {
    pool: SqlitePool,
}

impl WithdrawalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Lecturas (pool principal)
    // ---

    pub async fn find_recent(
        &self,
        branch_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Withdrawal>, AppError> {
        let withdrawals = if let Some(branch_id) = branch_id {
            sqlx::query_as::<_, Withdrawal>(
                "SELECT * FROM withdrawals WHERE branch_id = ? ORDER BY timestamp DESC LIMIT ?",
            )
            .bind(branch_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Withdrawal>(
                "SELECT * FROM withdrawals ORDER BY timestamp DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(withdrawals)
    }

    pub async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Withdrawal>, AppError> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            "SELECT * FROM withdrawals WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(withdrawals)
    }

    pub async fn count_by_reason(&self) -> Result<Vec<(WithdrawalReason, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (WithdrawalReason, i64)>(
            "SELECT reason, COUNT(*) FROM withdrawals GROUP BY reason",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Sucursales borradas quedan agrupadas como "Desconocida".
    pub async fn count_by_branch(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT COALESCE(b.name, 'Desconocida') AS branch, COUNT(*) AS count
            FROM withdrawals w
            LEFT JOIN branches b ON w.branch_id = b.id
            GROUP BY branch
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---
    // Operaciones transaccionales (executor genérico)
    // ---

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let withdrawal = sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(withdrawal)
    }

    // El orden de inserción de las líneas se conserva vía rowid.
    pub async fn find_items<'e, E>(
        &self,
        executor: E,
        withdrawal_id: Uuid,
    ) -> Result<Vec<WithdrawalItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, WithdrawalItem>(
            "SELECT * FROM withdrawal_items WHERE withdrawal_id = ?",
        )
        .bind(withdrawal_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn insert_withdrawal<'e, E>(
        &self,
        executor: E,
        withdrawal: &Withdrawal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO withdrawals (id, user_id, authorized_by_id, branch_id, reason, notes, status, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(withdrawal.id)
        .bind(withdrawal.user_id)
        .bind(withdrawal.authorized_by_id)
        .bind(withdrawal.branch_id)
        .bind(withdrawal.reason)
        .bind(&withdrawal.notes)
        .bind(withdrawal.status)
        .bind(withdrawal.timestamp)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn insert_item<'e, E>(&self, executor: E, item: &WithdrawalItem) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO withdrawal_items (id, withdrawal_id, product_id, quantity, from_pack)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id)
        .bind(item.withdrawal_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.from_pack)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: WithdrawalStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE withdrawals SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
