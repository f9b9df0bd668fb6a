// src/services/dashboard_service.rs

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardStats};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        self.repo.get_stats().await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::auth::UserRole;
    use crate::models::catalog::{Brand, ProductCategory};
    use crate::models::withdrawal::WithdrawalReason;
    use crate::test_support::{TestCtx, line_product};

    #[tokio::test]
    async fn stats_reflect_stock_bands_and_brand_totals() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("dash@grupo.ec", UserRole::Advisor, true, branch).await;

        // óptimo (20 > 5), reposición (3 <= 5), crítico (0)
        ctx.product("DB-1", Brand::Jac, ProductCategory::Merchandising, 20, 5).await;
        ctx.product("DB-2", Brand::Jetour, ProductCategory::Merchandising, 3, 5).await;
        let agotado = ctx.product("DB-3", Brand::Jac, ProductCategory::Oficina, 4, 5).await;
        ctx.pack("Kit Activo", true, &[(agotado.id, 1)]).await;
        ctx.pack("Kit Inactivo", false, &[(agotado.id, 1)]).await;

        // Vaciar DB-3 genera además una alerta activa.
        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(agotado.id, 4)],
            )
            .await
            .unwrap();

        let stats = ctx.dashboard.get_stats().await.unwrap();
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.total_stock, 23);
        assert_eq!(stats.critical_products, 1);
        assert_eq!(stats.reorder_products, 1);
        assert_eq!(stats.optimal_products, 1);
        assert_eq!(stats.active_alerts, 1);
        assert_eq!(stats.active_packs, 1);
        assert_eq!(stats.stock_by_brand.jac, 20);
        assert_eq!(stats.stock_by_brand.jetour, 3);
        assert_eq!(stats.stock_by_brand.karry, 0);
    }
}
