// src/services/withdrawal_service.rs
//
// El motor de retiros: expande packs a líneas planas, autoriza, valida stock
// y aplica la deducción como una sola unidad atómica. Toda la secuencia corre
// dentro de una transacción de SQLite; si cualquier paso falla no queda
// tocado ni el stock ni el historial.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, BranchRepository, CatalogRepository, UserRepository, WithdrawalRepository},
    models::{
        auth::User,
        catalog::{Product, ProductCategory},
        withdrawal::{
            Withdrawal, WithdrawalItem, WithdrawalItemView, WithdrawalLineInput, WithdrawalReason,
            WithdrawalReceipt, WithdrawalStatus, WithdrawalView,
        },
    },
    services::alert_service::AlertService,
};

// Línea ya expandida, lista para deducir.
struct ExpandedLine {
    product_id: Uuid,
    quantity: i64,
    from_pack: Option<Uuid>,
}

#[derive(Clone)]
pub struct WithdrawalService {
    pool: SqlitePool,
    catalog_repo: CatalogRepository,
    user_repo: UserRepository,
    branch_repo: BranchRepository,
    withdrawal_repo: WithdrawalRepository,
    audit_repo: AuditRepository,
    alert_service: AlertService,
}

impl WithdrawalService {
    pub fn new(
        pool: SqlitePool,
        catalog_repo: CatalogRepository,
        user_repo: UserRepository,
        branch_repo: BranchRepository,
        withdrawal_repo: WithdrawalRepository,
        audit_repo: AuditRepository,
        alert_service: AlertService,
    ) -> Self {
        Self {
            pool,
            catalog_repo,
            user_repo,
            branch_repo,
            withdrawal_repo,
            audit_repo,
            alert_service,
        }
    }

    pub async fn register_withdrawal(
        &self,
        requester: &User,
        branch_id: Uuid,
        reason: WithdrawalReason,
        notes: Option<String>,
        authorized_by_id: Option<Uuid>,
        items: &[WithdrawalLineInput],
    ) -> Result<WithdrawalReceipt, AppError> {
        // 1. Solo usuarios aprobados pueden transaccionar.
        if !requester.approved {
            return Err(AppError::NotApproved);
        }

        let mut tx = self.pool.begin().await?;

        // 2. Expansión del BOM: cada pack se aplana a sus componentes con
        // la cantidad multiplicada. Las líneas NO se fusionan aunque dos
        // fuentes referencien el mismo producto.
        let mut expanded: Vec<ExpandedLine> = Vec::new();
        for item in items {
            if let Some(pack_id) = item.pack_id {
                let pack = self
                    .catalog_repo
                    .find_pack_by_id(&mut *tx, pack_id)
                    .await?
                    .filter(|p| p.active)
                    .ok_or(AppError::PackNotFound)?;

                let pack_items = self.catalog_repo.find_pack_items(&mut *tx, pack.id).await?;
                for pi in pack_items {
                    expanded.push(ExpandedLine {
                        product_id: pi.product_id,
                        quantity: pi.quantity * item.quantity,
                        from_pack: Some(pack_id),
                    });
                }
            } else if let Some(product_id) = item.product_id {
                expanded.push(ExpandedLine {
                    product_id,
                    quantity: item.quantity,
                    from_pack: None,
                });
            }
        }

        if expanded.is_empty() {
            return Err(AppError::EmptySelection);
        }

        // 3. Resolver todos los productos referenciados.
        let mut lines: Vec<(ExpandedLine, Product)> = Vec::with_capacity(expanded.len());
        for line in expanded {
            let product = self
                .catalog_repo
                .find_product_by_id(&mut *tx, line.product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;
            lines.push((line, product));
        }

        // 4. Los artículos de Exhibición (POP permanente) requieren un
        // autorizador con rol supervisor o admin.
        let has_display_items = lines
            .iter()
            .any(|(_, p)| p.category == ProductCategory::Exhibicion);

        if has_display_items {
            let authorizer_id = authorized_by_id.ok_or(AppError::AuthorizationRequired)?;
            let authorizer = self
                .user_repo
                .find_by_id(&mut *tx, authorizer_id)
                .await?
                .ok_or(AppError::AuthorizationDenied)?;
            if !authorizer.role.can_authorize_display_items() {
                return Err(AppError::AuthorizationDenied);
            }
        }

        // 5. Verificación de stock ANTES de tocar nada. La demanda se agrega
        // por producto: dos líneas que piden el mismo producto se validan
        // contra su suma, no cada una por separado.
        let mut demand: HashMap<Uuid, i64> = HashMap::new();
        for (line, _) in &lines {
            *demand.entry(line.product_id).or_insert(0) += line.quantity;
        }
        for (line, product) in &lines {
            let requested = demand[&line.product_id];
            if product.stock < requested {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock,
                    requested,
                });
            }
        }

        // 6. Deducción línea por línea. `running` acumula el stock ya
        // descontado en esta misma transacción para productos repetidos;
        // la alarma corre con el stock posterior a cada deducción.
        let withdrawal_id = Uuid::new_v4();
        let mut running: HashMap<Uuid, i64> = HashMap::new();
        let mut recorded: Vec<WithdrawalItem> = Vec::with_capacity(lines.len());

        for (line, product) in &lines {
            let stock = running.entry(line.product_id).or_insert(product.stock);
            let new_stock = *stock - line.quantity;
            *stock = new_stock;

            self.catalog_repo
                .update_product_stock(&mut *tx, line.product_id, new_stock)
                .await?;

            self.alert_service
                .check_stock_alarm(&mut tx, product, new_stock)
                .await?;

            recorded.push(WithdrawalItem {
                id: Uuid::new_v4(),
                withdrawal_id,
                product_id: line.product_id,
                quantity: line.quantity,
                from_pack: line.from_pack,
            });
        }

        // 7. Registro inmutable del retiro.
        let withdrawal = Withdrawal {
            id: withdrawal_id,
            user_id: requester.id,
            authorized_by_id,
            branch_id,
            reason,
            notes,
            status: WithdrawalStatus::Completed,
            timestamp: Utc::now(),
        };
        self.withdrawal_repo
            .insert_withdrawal(&mut *tx, &withdrawal)
            .await?;
        for item in &recorded {
            self.withdrawal_repo.insert_item(&mut *tx, item).await?;
        }

        // 8. Auditoría, dentro de la misma transacción.
        self.audit_repo
            .append(
                &mut *tx,
                Some(requester.id),
                "NEW_WITHDRAWAL",
                &format!("Retiro: {} items, razón: {}", recorded.len(), reason),
                Some("withdrawals"),
                Some(withdrawal_id.to_string()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            withdrawal = %withdrawal_id,
            user = %requester.email,
            items = recorded.len(),
            "retiro registrado"
        );

        Ok(WithdrawalReceipt {
            withdrawal_id,
            item_count: recorded.len(),
        })
    }

    /// Reversa compensatoria: devuelve el stock de cada línea registrada y
    /// marca el retiro como revertido. Las líneas cuyo producto ya no existe
    /// se omiten en silencio. Las alertas NO se tocan: la reversa no es un
    /// inverso exacto del registro.
    pub async fn revert_withdrawal(
        &self,
        requester: &User,
        withdrawal_id: Uuid,
    ) -> Result<(), AppError> {
        if !requester.approved {
            return Err(AppError::NotApproved);
        }

        let mut tx = self.pool.begin().await?;

        let withdrawal = self
            .withdrawal_repo
            .find_by_id(&mut *tx, withdrawal_id)
            .await?
            .ok_or(AppError::WithdrawalNotFound)?;

        if withdrawal.status == WithdrawalStatus::Reverted {
            return Err(AppError::AlreadyReverted);
        }

        let items = self
            .withdrawal_repo
            .find_items(&mut *tx, withdrawal_id)
            .await?;

        for item in &items {
            let product = self
                .catalog_repo
                .find_product_by_id(&mut *tx, item.product_id)
                .await?;
            if let Some(product) = product {
                self.catalog_repo
                    .update_product_stock(&mut *tx, product.id, product.stock + item.quantity)
                    .await?;
            }
        }

        self.withdrawal_repo
            .set_status(&mut *tx, withdrawal_id, WithdrawalStatus::Reverted)
            .await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(requester.id),
                "REVERT_WITHDRAWAL",
                &format!("Retiro revertido: {withdrawal_id}"),
                Some("withdrawals"),
                Some(withdrawal_id.to_string()),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(withdrawal = %withdrawal_id, user = %requester.email, "retiro revertido");
        Ok(())
    }

    // Historial enriquecido para la UI. Tolera referencias colgantes:
    // usuarios, sucursales y productos borrados salen con su centinela.
    pub async fn list_withdrawals(
        &self,
        branch_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<WithdrawalView>, AppError> {
        let withdrawals = self
            .withdrawal_repo
            .find_recent(branch_id, limit.unwrap_or(50))
            .await?;

        let mut views = Vec::with_capacity(withdrawals.len());
        for w in withdrawals {
            views.push(self.enrich_withdrawal(w).await?);
        }
        Ok(views)
    }

    async fn enrich_withdrawal(&self, w: Withdrawal) -> Result<WithdrawalView, AppError> {
        let user_name = self
            .user_repo
            .find_by_id(&self.pool, w.user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "Usuario eliminado".to_string());

        let branch_name = self
            .branch_repo
            .find_by_id(&self.pool, w.branch_id)
            .await?
            .map(|b| b.name)
            .unwrap_or_else(|| "Sucursal eliminada".to_string());

        let authorizer_name = match w.authorized_by_id {
            Some(id) => self
                .user_repo
                .find_by_id(&self.pool, id)
                .await?
                .map(|u| u.name),
            None => None,
        };

        let items = self.withdrawal_repo.find_items(&self.pool, w.id).await?;
        let mut item_views = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .catalog_repo
                .find_product_by_id(&self.pool, item.product_id)
                .await?;
            let (product_name, product_sku) = match product {
                Some(p) => (p.name, p.sku),
                None => ("Eliminado".to_string(), "N/A".to_string()),
            };
            item_views.push(WithdrawalItemView {
                product_id: item.product_id,
                quantity: item.quantity,
                from_pack: item.from_pack,
                product_name,
                product_sku,
            });
        }

        Ok(WithdrawalView {
            id: w.id,
            user_id: w.user_id,
            authorized_by_id: w.authorized_by_id,
            branch_id: w.branch_id,
            reason: w.reason,
            notes: w.notes,
            status: w.status,
            timestamp: w.timestamp,
            user_name,
            branch_name,
            authorizer_name,
            items: item_views,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::AlertType;
    use crate::models::auth::UserRole;
    use crate::models::catalog::Brand;
    use crate::test_support::{TestCtx, line_pack, line_product};

    #[tokio::test]
    async fn pack_expansion_deducts_components() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("jperez@grupo.ec", UserRole::Advisor, true, branch).await;
        let x = ctx.product("SKU-X", Brand::Jac, ProductCategory::Merchandising, 50, 5).await;
        let pack = ctx.pack("Kit Entrega", true, &[(x.id, 2)]).await;

        let receipt = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_pack(pack, 3)],
            )
            .await
            .unwrap();

        assert_eq!(receipt.item_count, 1);
        assert_eq!(ctx.stock_of(x.id).await, 50 - 2 * 3);

        let views = ctx.withdrawals.list_withdrawals(None, None).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].items.len(), 1);
        assert_eq!(views[0].items[0].quantity, 6);
        assert_eq!(views[0].items[0].from_pack, Some(pack));
    }

    #[tokio::test]
    async fn kit_with_two_components_expands_by_requested_quantity() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Ficoa").await;
        let user = ctx.user("a@grupo.ec", UserRole::Advisor, true, branch).await;
        let x = ctx.product("KIT-X", Brand::Jetour, ProductCategory::Merchandising, 100, 0).await;
        let y = ctx.product("KIT-Y", Brand::Jetour, ProductCategory::Merchandising, 100, 0).await;
        let pack = ctx.pack("Kit A", true, &[(x.id, 1), (y.id, 2)]).await;

        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Feria,
                None,
                None,
                &[line_pack(pack, 3)],
            )
            .await
            .unwrap();

        assert_eq!(ctx.stock_of(x.id).await, 97);
        assert_eq!(ctx.stock_of(y.id).await, 94);
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_without_touching_any_line() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("b@grupo.ec", UserRole::Advisor, true, branch).await;
        let a = ctx.product("AT-A", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;
        let b = ctx.product("AT-B", Brand::Jac, ProductCategory::Merchandising, 2, 0).await;

        let err = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(a.id, 5), line_product(b.id, 5)],
            )
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("se esperaba InsufficientStock, llegó {other:?}"),
        }

        // Nada cambió: ni siquiera la línea que sí tenía stock.
        assert_eq!(ctx.stock_of(a.id).await, 10);
        assert_eq!(ctx.stock_of(b.id).await, 2);
        assert!(ctx.withdrawals.list_withdrawals(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn combined_demand_for_same_product_is_validated_as_a_sum() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("c@grupo.ec", UserRole::Advisor, true, branch).await;
        // 5 en stock; una línea directa de 3 más un pack que pide 3 del mismo
        // producto: cada línea cabe sola, la suma no.
        let p = ctx.product("DUP-1", Brand::Karry, ProductCategory::Merchandising, 5, 0).await;
        let pack = ctx.pack("Pack Duplicado", true, &[(p.id, 3)]).await;

        let err = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[line_product(p.id, 3), line_pack(pack, 1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(ctx.stock_of(p.id).await, 5);
    }

    #[tokio::test]
    async fn same_product_twice_within_stock_deducts_both_lines() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("d@grupo.ec", UserRole::Advisor, true, branch).await;
        let p = ctx.product("DUP-2", Brand::Karry, ProductCategory::Merchandising, 10, 0).await;
        let pack = ctx.pack("Pack Doble", true, &[(p.id, 2)]).await;

        let receipt = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[line_product(p.id, 3), line_pack(pack, 2)],
            )
            .await
            .unwrap();

        // Dos líneas independientes: 3 directas + 4 del pack.
        assert_eq!(receipt.item_count, 2);
        assert_eq!(ctx.stock_of(p.id).await, 3);
    }

    #[tokio::test]
    async fn display_items_require_supervisor_authorization() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let advisor = ctx.user("adv@grupo.ec", UserRole::Advisor, true, branch).await;
        let advisor2 = ctx.user("adv2@grupo.ec", UserRole::Advisor, true, branch).await;
        let supervisor = ctx.user("sup@grupo.ec", UserRole::Supervisor, true, branch).await;
        let totem = ctx.product("POP-1", Brand::Jac, ProductCategory::Exhibicion, 4, 0).await;

        // Sin autorizador.
        let err = ctx
            .withdrawals
            .register_withdrawal(
                &advisor,
                branch,
                WithdrawalReason::ActivacionMall,
                None,
                None,
                &[line_product(totem.id, 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorizationRequired));

        // Autorizador sin rango.
        let err = ctx
            .withdrawals
            .register_withdrawal(
                &advisor,
                branch,
                WithdrawalReason::ActivacionMall,
                None,
                Some(advisor2.id),
                &[line_product(totem.id, 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorizationDenied));
        assert_eq!(ctx.stock_of(totem.id).await, 4);

        // Supervisor autoriza.
        ctx.withdrawals
            .register_withdrawal(
                &advisor,
                branch,
                WithdrawalReason::ActivacionMall,
                None,
                Some(supervisor.id),
                &[line_product(totem.id, 1)],
            )
            .await
            .unwrap();
        assert_eq!(ctx.stock_of(totem.id).await, 3);
    }

    #[tokio::test]
    async fn unapproved_requester_is_rejected() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let pending = ctx.user("pend@grupo.ec", UserRole::Advisor, false, branch).await;
        let p = ctx.product("NA-1", Brand::Corp, ProductCategory::Oficina, 10, 0).await;

        let err = ctx
            .withdrawals
            .register_withdrawal(
                &pending,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(p.id, 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotApproved));
    }

    #[tokio::test]
    async fn empty_selection_and_inactive_pack_fail() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("e@grupo.ec", UserRole::Advisor, true, branch).await;
        let p = ctx.product("IN-1", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;
        let inactive = ctx.pack("Pack Viejo", false, &[(p.id, 1)]).await;

        let err = ctx
            .withdrawals
            .register_withdrawal(&user, branch, WithdrawalReason::Otro, None, None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptySelection));

        // Una línea sin producto ni pack tampoco cuenta.
        let err = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[WithdrawalLineInput {
                    product_id: None,
                    pack_id: None,
                    quantity: 2,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptySelection));

        let err = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[line_pack(inactive, 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PackNotFound));
    }

    #[tokio::test]
    async fn low_stock_alert_fires_once_and_never_upgrades() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("f@grupo.ec", UserRole::Advisor, true, branch).await;
        // Escenario del manual: stock 10, mínimo 5.
        let p = ctx.product("AL-1", Brand::Jac, ProductCategory::Merchandising, 10, 5).await;

        // Retiro de 7 -> stock 3 (<= 5): nace una alerta low_stock.
        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(p.id, 7)],
            )
            .await
            .unwrap();

        let unresolved = ctx.alerts.list_alerts(Some(false)).await.unwrap();
        assert_eq!(unresolved.len(), 1);
        assert!(matches!(unresolved[0].alert_type, AlertType::LowStock));

        // Retiro de los 3 restantes -> stock 0, pero la alerta existente
        // sigue sin resolver: no se inserta una out_of_stock encima.
        ctx.withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(p.id, 3)],
            )
            .await
            .unwrap();

        assert_eq!(ctx.stock_of(p.id).await, 0);
        let unresolved = ctx.alerts.list_alerts(Some(false)).await.unwrap();
        assert_eq!(unresolved.len(), 1);
        assert!(matches!(unresolved[0].alert_type, AlertType::LowStock));
    }

    #[tokio::test]
    async fn revert_restores_stock_exactly_once() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("g@grupo.ec", UserRole::Advisor, true, branch).await;
        let p = ctx.product("RV-1", Brand::Corp, ProductCategory::Oficina, 20, 0).await;

        let receipt = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Obsequio,
                None,
                None,
                &[line_product(p.id, 5)],
            )
            .await
            .unwrap();
        assert_eq!(ctx.stock_of(p.id).await, 15);

        ctx.withdrawals
            .revert_withdrawal(&user, receipt.withdrawal_id)
            .await
            .unwrap();
        assert_eq!(ctx.stock_of(p.id).await, 20);

        let views = ctx.withdrawals.list_withdrawals(None, None).await.unwrap();
        assert!(matches!(views[0].status, WithdrawalStatus::Reverted));

        // La segunda reversa es rechazada.
        let err = ctx
            .withdrawals
            .revert_withdrawal(&user, receipt.withdrawal_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReverted));
        assert_eq!(ctx.stock_of(p.id).await, 20);
    }

    #[tokio::test]
    async fn revert_skips_deleted_products_silently() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let admin = ctx.user("adm@grupo.ec", UserRole::Admin, true, branch).await;
        let kept = ctx.product("RD-1", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;
        let doomed = ctx.product("RD-2", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;

        let receipt = ctx
            .withdrawals
            .register_withdrawal(
                &admin,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[line_product(kept.id, 4), line_product(doomed.id, 4)],
            )
            .await
            .unwrap();

        ctx.catalog.delete_product(&admin, doomed.id).await.unwrap();

        ctx.withdrawals
            .revert_withdrawal(&admin, receipt.withdrawal_id)
            .await
            .unwrap();

        // El producto vivo recupera sus 4; el borrado simplemente se omite.
        assert_eq!(ctx.stock_of(kept.id).await, 10);

        // Y el historial muestra la línea colgante con su centinela.
        let views = ctx.withdrawals.list_withdrawals(None, None).await.unwrap();
        let deleted_line = views[0]
            .items
            .iter()
            .find(|i| i.product_id == doomed.id)
            .unwrap();
        assert_eq!(deleted_line.product_name, "Eliminado");
        assert_eq!(deleted_line.product_sku, "N/A");
    }

    #[tokio::test]
    async fn missing_product_aborts_the_whole_request() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let user = ctx.user("h@grupo.ec", UserRole::Advisor, true, branch).await;
        let p = ctx.product("MS-1", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;

        let err = ctx
            .withdrawals
            .register_withdrawal(
                &user,
                branch,
                WithdrawalReason::Otro,
                None,
                None,
                &[line_product(p.id, 1), line_product(Uuid::new_v4(), 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound));
        assert_eq!(ctx.stock_of(p.id).await, 10);
    }

    #[tokio::test]
    async fn listing_filters_by_branch_and_enriches_names() {
        let ctx = TestCtx::new().await;
        let matriz = ctx.branch("Matriz").await;
        let ficoa = ctx.branch("Ficoa").await;
        let user = ctx.user("i@grupo.ec", UserRole::Advisor, true, matriz).await;
        let p = ctx.product("LS-1", Brand::Jetour, ProductCategory::Merchandising, 30, 0).await;

        ctx.withdrawals
            .register_withdrawal(
                &user,
                matriz,
                WithdrawalReason::Feria,
                Some("stand feria".to_string()),
                None,
                &[line_product(p.id, 2)],
            )
            .await
            .unwrap();
        ctx.withdrawals
            .register_withdrawal(
                &user,
                ficoa,
                WithdrawalReason::Entrega,
                None,
                None,
                &[line_product(p.id, 1)],
            )
            .await
            .unwrap();

        let all = ctx.withdrawals.list_withdrawals(None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_matriz = ctx
            .withdrawals
            .list_withdrawals(Some(matriz), None)
            .await
            .unwrap();
        assert_eq!(only_matriz.len(), 1);
        assert_eq!(only_matriz[0].branch_name, "Matriz");
        assert_eq!(only_matriz[0].user_name, user.name);
        assert_eq!(only_matriz[0].items[0].product_sku, "LS-1");
    }
}
