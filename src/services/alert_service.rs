// src/services/alert_service.rs

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AlertRepository, AuditRepository, CatalogRepository},
    models::{
        alert::{Alert, AlertType, AlertView},
        auth::User,
        catalog::Product,
    },
};

#[derive(Clone)]
pub struct AlertService {
    pool: SqlitePool,
    alert_repo: AlertRepository,
    catalog_repo: CatalogRepository,
    audit_repo: AuditRepository,
}

impl AlertService {
    pub fn new(
        pool: SqlitePool,
        alert_repo: AlertRepository,
        catalog_repo: CatalogRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            pool,
            alert_repo,
            catalog_repo,
            audit_repo,
        }
    }

    /// Chequeo de alarma tras una deducción o edición de stock. Corre dentro
    /// de la transacción del que llama: recibe la conexión, no la pool.
    ///
    /// Si el stock quedó en o bajo el mínimo y el producto no tiene ya una
    /// alerta sin resolver, inserta una nueva. Reponer stock nunca resuelve
    /// alertas solo: eso exige un `resolve_alert` explícito de una persona.
    pub async fn check_stock_alarm(
        &self,
        conn: &mut SqliteConnection,
        product: &Product,
        new_stock: i64,
    ) -> Result<(), AppError> {
        if new_stock > product.min_stock {
            return Ok(());
        }

        let existing = self
            .alert_repo
            .find_unresolved_for_product(&mut *conn, product.id)
            .await?;
        if existing.is_some() {
            // Ya hay una alerta activa para este producto; no se duplica
            // ni se "asciende" a out_of_stock.
            return Ok(());
        }

        let alert = Alert {
            id: Uuid::new_v4(),
            product_id: product.id,
            alert_type: if new_stock == 0 {
                AlertType::OutOfStock
            } else {
                AlertType::LowStock
            },
            message: format!("{}: Stock {}/{}", product.name, new_stock, product.min_stock),
            resolved: false,
            created_at: Utc::now(),
        };
        self.alert_repo.insert(&mut *conn, &alert).await?;

        tracing::warn!(
            product = %product.sku,
            stock = new_stock,
            min_stock = product.min_stock,
            "alerta de stock generada"
        );
        Ok(())
    }

    pub async fn resolve_alert(&self, actor: &User, alert_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = self.alert_repo.resolve(&mut *tx, alert_id).await?;
        if updated == 0 {
            return Err(AppError::AlertNotFound);
        }

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "resolve_alert",
                &format!("Alerta resuelta: {alert_id}"),
                Some("alerts"),
                Some(alert_id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // Lista con los datos del producto resueltos; un producto borrado se
    // muestra como "Producto eliminado".
    pub async fn list_alerts(&self, resolved: Option<bool>) -> Result<Vec<AlertView>, AppError> {
        let alerts = self.alert_repo.find_all(resolved).await?;

        let mut views = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let product = self
                .catalog_repo
                .find_product_by_id(&self.pool, alert.product_id)
                .await?;

            let view = match product {
                Some(p) => AlertView {
                    id: alert.id,
                    product_id: alert.product_id,
                    alert_type: alert.alert_type,
                    message: alert.message,
                    resolved: alert.resolved,
                    created_at: alert.created_at,
                    product_name: p.name,
                    product_sku: p.sku,
                    product_brand: Some(p.brand),
                    current_stock: Some(p.stock),
                },
                None => AlertView {
                    id: alert.id,
                    product_id: alert.product_id,
                    alert_type: alert.alert_type,
                    message: alert.message,
                    resolved: alert.resolved,
                    created_at: alert.created_at,
                    product_name: "Producto eliminado".to_string(),
                    product_sku: "N/A".to_string(),
                    product_brand: None,
                    current_stock: None,
                },
            };
            views.push(view);
        }
        Ok(views)
    }
}
