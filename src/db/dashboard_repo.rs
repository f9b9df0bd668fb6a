// src/db/dashboard_repo.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::{
        catalog::Brand,
        dashboard::{DashboardStats, StockByBrand},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Todo el resumen sale de una transacción para que los contadores sean
    // un snapshot coherente del catálogo.
    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        let mut tx = self.pool.begin().await?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;

        let total_stock: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(stock), 0) FROM products")
                .fetch_one(&mut *tx)
                .await?;

        let critical_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock = 0")
                .fetch_one(&mut *tx)
                .await?;

        let reorder_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE stock > 0 AND stock <= min_stock",
        )
        .fetch_one(&mut *tx)
        .await?;

        let optimal_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock > min_stock")
                .fetch_one(&mut *tx)
                .await?;

        let active_alerts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE resolved = 0")
                .fetch_one(&mut *tx)
                .await?;

        let active_packs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM packs WHERE active = 1")
                .fetch_one(&mut *tx)
                .await?;

        let by_brand = sqlx::query_as::<_, (Brand, i64)>(
            "SELECT brand, COALESCE(SUM(stock), 0) FROM products GROUP BY brand",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut stock_by_brand = StockByBrand::default();
        for (brand, total) in by_brand {
            match brand {
                Brand::Jac => stock_by_brand.jac = total,
                Brand::Jetour => stock_by_brand.jetour = total,
                Brand::Karry => stock_by_brand.karry = total,
                Brand::Corp => stock_by_brand.corp = total,
            }
        }

        Ok(DashboardStats {
            total_products,
            total_stock,
            critical_products,
            reorder_products,
            optimal_products,
            active_alerts,
            active_packs,
            stock_by_brand,
        })
    }
}
