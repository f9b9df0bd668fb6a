// src/services/report_service.rs
//
// Fachada de reportes: agregación de solo lectura sobre el historial de
// retiros. Consumidor del motor, nunca parte de él; el formato final
// (PDF/CSV) lo arma quien consume estos datos.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BranchRepository, CatalogRepository, UserRepository, WithdrawalRepository},
    models::{
        catalog::Brand,
        report::{
            AuditReport, AuditReportDateRange, AuditReportRow, AuditReportSummary, BranchCount,
            ReasonCount,
        },
    },
};

#[derive(Clone)]
pub struct ReportService {
    pool: SqlitePool,
    withdrawal_repo: WithdrawalRepository,
    branch_repo: BranchRepository,
    user_repo: UserRepository,
    catalog_repo: CatalogRepository,
}

impl ReportService {
    pub fn new(
        pool: SqlitePool,
        withdrawal_repo: WithdrawalRepository,
        branch_repo: BranchRepository,
        user_repo: UserRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self {
            pool,
            withdrawal_repo,
            branch_repo,
            user_repo,
            catalog_repo,
        }
    }

    pub async fn withdrawals_by_reason(&self) -> Result<Vec<ReasonCount>, AppError> {
        let rows = self.withdrawal_repo.count_by_reason().await?;
        Ok(rows
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect())
    }

    pub async fn withdrawals_by_branch(&self) -> Result<Vec<BranchCount>, AppError> {
        let rows = self.withdrawal_repo.count_by_branch().await?;
        Ok(rows
            .into_iter()
            .map(|(branch, count)| BranchCount { branch, count })
            .collect())
    }

    /// Reporte de auditoría por rango de fechas: una fila por producto
    /// retirado, con filtros opcionales por marca y sucursal. Las
    /// referencias colgantes salen con su centinela, nunca rompen el
    /// reporte.
    pub async fn audit_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        brand: Option<Brand>,
        branch_id: Option<Uuid>,
    ) -> Result<AuditReport, AppError> {
        let withdrawals = self.withdrawal_repo.find_in_range(start, end).await?;
        let withdrawals: Vec<_> = withdrawals
            .into_iter()
            .filter(|w| branch_id.is_none_or(|b| w.branch_id == b))
            .collect();

        let mut rows = Vec::new();
        let mut by_reason: BTreeMap<String, i64> = BTreeMap::new();

        for w in &withdrawals {
            *by_reason.entry(w.reason.as_str().to_string()).or_insert(0) += 1;

            let usuario = self
                .user_repo
                .find_by_id(&self.pool, w.user_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_else(|| "Usuario eliminado".to_string());
            let sucursal = self
                .branch_repo
                .find_by_id(&self.pool, w.branch_id)
                .await?
                .map(|b| b.name)
                .unwrap_or_else(|| "Sucursal eliminada".to_string());
            let autorizador = match w.authorized_by_id {
                Some(id) => self
                    .user_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_else(|| "N/A".to_string()),
                None => "N/A".to_string(),
            };

            let items = self.withdrawal_repo.find_items(&self.pool, w.id).await?;
            for item in items {
                let product = self
                    .catalog_repo
                    .find_product_by_id(&self.pool, item.product_id)
                    .await?;

                // Con filtro de marca, las líneas de otras marcas (o de
                // productos ya borrados) se omiten.
                if let Some(brand) = brand {
                    match &product {
                        Some(p) if p.brand == brand => {}
                        _ => continue,
                    }
                }

                let (producto, sku) = match &product {
                    Some(p) => (p.name.clone(), p.sku.clone()),
                    None => ("Eliminado".to_string(), "N/A".to_string()),
                };

                rows.push(AuditReportRow {
                    fecha: w.timestamp.format("%Y-%m-%d").to_string(),
                    hora: w.timestamp.format("%H:%M:%S").to_string(),
                    sucursal: sucursal.clone(),
                    usuario: usuario.clone(),
                    autorizador: autorizador.clone(),
                    razon: w.reason,
                    producto,
                    sku,
                    cantidad: item.quantity,
                    estado: w.status,
                    notas: w.notes.clone().unwrap_or_default(),
                });
            }
        }

        let total_items = rows.iter().map(|r| r.cantidad).sum();

        Ok(AuditReport {
            generated_at: Utc::now(),
            date_range: AuditReportDateRange {
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
            },
            summary: AuditReportSummary {
                total_withdrawals: withdrawals.len(),
                total_items,
                by_reason,
            },
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::models::catalog::ProductCategory;
    use crate::models::withdrawal::WithdrawalReason;
    use crate::test_support::{TestCtx, line_product};
    use chrono::Duration;

    #[tokio::test]
    async fn report_groups_counts_and_filters_by_brand() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("rep@grupo.ec", UserRole::Advisor, true, branch).await;
        let jac = ctx.product("RP-JAC", Brand::Jac, ProductCategory::Merchandising, 50, 0).await;
        let jet = ctx.product("RP-JET", Brand::Jetour, ProductCategory::Merchandising, 50, 0).await;

        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Feria,
                Some("feria Ambato".to_string()),
                None,
                &[line_product(jac.id, 5), line_product(jet.id, 2)],
            )
            .await
            .unwrap();
        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Feria,
                None,
                None,
                &[line_product(jac.id, 1)],
            )
            .await
            .unwrap();

        let by_reason = ctx.reports.withdrawals_by_reason().await.unwrap();
        assert_eq!(by_reason.len(), 1);
        assert_eq!(by_reason[0].count, 2);

        let by_branch = ctx.reports.withdrawals_by_branch().await.unwrap();
        assert_eq!(by_branch[0].branch, "Matriz");
        assert_eq!(by_branch[0].count, 2);

        let now = Utc::now();
        let report = ctx
            .reports
            .audit_report(now - Duration::days(1), now + Duration::days(1), None, None)
            .await
            .unwrap();
        assert_eq!(report.summary.total_withdrawals, 2);
        assert_eq!(report.summary.total_items, 8);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.summary.by_reason.get("Feria"), Some(&2));

        // Filtrado por marca: solo quedan las líneas JAC.
        let jac_only = ctx
            .reports
            .audit_report(
                now - Duration::days(1),
                now + Duration::days(1),
                Some(Brand::Jac),
                None,
            )
            .await
            .unwrap();
        assert_eq!(jac_only.rows.len(), 2);
        assert!(jac_only.rows.iter().all(|r| r.sku == "RP-JAC"));

        // Fuera de rango: vacío.
        let empty = ctx
            .reports
            .audit_report(
                now - Duration::days(10),
                now - Duration::days(5),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.summary.total_withdrawals, 0);
    }
}
