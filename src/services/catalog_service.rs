// src/services/catalog_service.rs

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, CatalogRepository},
    models::{
        auth::User,
        catalog::{
            Brand, Pack, PackItem, PackItemInput, PackItemView, PackUpdate, PackView, Product,
            ProductCategory, ProductUpdate,
        },
    },
    services::alert_service::AlertService,
};

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    catalog_repo: CatalogRepository,
    audit_repo: AuditRepository,
    alert_service: AlertService,
}

impl CatalogService {
    pub fn new(
        pool: SqlitePool,
        catalog_repo: CatalogRepository,
        audit_repo: AuditRepository,
        alert_service: AlertService,
    ) -> Self {
        Self {
            pool,
            catalog_repo,
            audit_repo,
            alert_service,
        }
    }

    // ---
    // Productos
    // ---

    pub async fn list_products(
        &self,
        brand: Option<Brand>,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, AppError> {
        self.catalog_repo.find_products(brand, category).await
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Product, AppError> {
        self.catalog_repo
            .find_product_by_sku(&self.pool, sku)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        actor: &User,
        sku: &str,
        name: &str,
        brand: Brand,
        category: ProductCategory,
        stock: i64,
        min_stock: i64,
        description: Option<String>,
        image_url: Option<String>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        // El SKU es único e inmutable: el chequeo corre dentro de la
        // transacción de alta.
        if self
            .catalog_repo
            .find_product_by_sku(&mut *tx, sku)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateSku(sku.to_string()));
        }

        let product = Product {
            id: Uuid::new_v4(),
            sku: sku.to_string(),
            name: name.to_string(),
            brand,
            category,
            stock,
            min_stock,
            description,
            image_url,
            created_at: Utc::now(),
        };
        self.catalog_repo.insert_product(&mut *tx, &product).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "create_product",
                &format!("Producto creado: {} ({})", product.name, product.sku),
                Some("products"),
                Some(product.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    // Parche tipado; sku, marca y categoría quedan fuera a propósito.
    // Si el parche trae stock, la alarma corre con el nivel nuevo.
    pub async fn update_product(
        &self,
        actor: &User,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut product = self
            .catalog_repo
            .find_product_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let stock_changed = update.stock.is_some();

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        if let Some(min_stock) = update.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            product.image_url = Some(image_url);
        }

        self.catalog_repo.update_product(&mut *tx, &product).await?;

        if stock_changed {
            self.alert_service
                .check_stock_alarm(&mut tx, &product, product.stock)
                .await?;
        }

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "update_product",
                &format!("Producto actualizado: {}", product.name),
                Some("products"),
                Some(product.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn delete_product(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let product = self
            .catalog_repo
            .find_product_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        self.catalog_repo.delete_product(&mut *tx, id).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "delete_product",
                &format!("Producto eliminado: {} ({})", product.name, product.sku),
                Some("products"),
                Some(id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Packs
    // ---

    pub async fn create_pack(
        &self,
        actor: &User,
        name: &str,
        description: &str,
        brand: Brand,
        active: bool,
        items: &[PackItemInput],
    ) -> Result<Pack, AppError> {
        let mut tx = self.pool.begin().await?;

        let pack = Pack {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            brand,
            active,
            created_at: Utc::now(),
        };
        self.catalog_repo.insert_pack(&mut *tx, &pack).await?;

        for item in items {
            self.catalog_repo
                .insert_pack_item(
                    &mut *tx,
                    &PackItem {
                        id: Uuid::new_v4(),
                        pack_id: pack.id,
                        product_id: item.product_id,
                        quantity: item.quantity,
                    },
                )
                .await?;
        }

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "create_pack",
                &format!("Pack creado: {} con {} items", pack.name, items.len()),
                Some("packs"),
                Some(pack.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(pack)
    }

    // El pack y su BOM son un solo agregado: si el parche trae `items`,
    // el BOM entero se reemplaza (borrar todo + insertar todo) dentro de
    // la misma transacción que el resto del parche.
    pub async fn update_pack(
        &self,
        actor: &User,
        id: Uuid,
        update: PackUpdate,
    ) -> Result<Pack, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut pack = self
            .catalog_repo
            .find_pack_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::PackNotFound)?;

        if let Some(name) = update.name {
            pack.name = name;
        }
        if let Some(description) = update.description {
            pack.description = description;
        }
        if let Some(active) = update.active {
            pack.active = active;
        }
        self.catalog_repo.update_pack(&mut *tx, &pack).await?;

        if let Some(items) = update.items {
            self.catalog_repo.delete_pack_items(&mut *tx, id).await?;
            for item in &items {
                self.catalog_repo
                    .insert_pack_item(
                        &mut *tx,
                        &PackItem {
                            id: Uuid::new_v4(),
                            pack_id: id,
                            product_id: item.product_id,
                            quantity: item.quantity,
                        },
                    )
                    .await?;
            }
        }

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "update_pack",
                &format!("Pack actualizado: {}", pack.name),
                Some("packs"),
                Some(pack.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(pack)
    }

    pub async fn list_packs(&self, active_only: bool) -> Result<Vec<PackView>, AppError> {
        let packs = self.catalog_repo.find_packs(active_only).await?;

        let mut views = Vec::with_capacity(packs.len());
        for pack in packs {
            let items = self.get_pack_items(pack.id).await?;
            views.push(PackView {
                id: pack.id,
                name: pack.name,
                description: pack.description,
                brand: pack.brand,
                active: pack.active,
                item_count: items.len(),
                items,
            });
        }
        Ok(views)
    }

    // Join de lectura: cada componente sale con nombre, SKU y stock actual
    // del producto, tolerando componentes cuyo producto ya no existe.
    pub async fn get_pack_items(&self, pack_id: Uuid) -> Result<Vec<PackItemView>, AppError> {
        let items = self.catalog_repo.find_pack_items(&self.pool, pack_id).await?;

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .catalog_repo
                .find_product_by_id(&self.pool, item.product_id)
                .await?;
            let view = match product {
                Some(p) => PackItemView {
                    id: item.id,
                    pack_id: item.pack_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    product_name: p.name,
                    product_sku: p.sku,
                    current_stock: p.stock,
                    min_stock: p.min_stock,
                },
                None => PackItemView {
                    id: item.id,
                    pack_id: item.pack_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    product_name: "Eliminado".to_string(),
                    product_sku: "N/A".to_string(),
                    current_stock: 0,
                    min_stock: 0,
                },
            };
            views.push(view);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::test_support::TestCtx;

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let admin = ctx.user("adm@grupo.ec", UserRole::Admin, true, branch).await;

        ctx.catalog
            .create_product(
                &admin,
                "GORRA-JAC",
                "Gorra JAC",
                Brand::Jac,
                ProductCategory::Merchandising,
                100,
                10,
                None,
                None,
            )
            .await
            .unwrap();

        let err = ctx
            .catalog
            .create_product(
                &admin,
                "GORRA-JAC",
                "Otra gorra",
                Brand::Jac,
                ProductCategory::Merchandising,
                5,
                0,
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSku(_)));

        // El catálogo sigue con un solo producto.
        assert_eq!(ctx.catalog.list_products(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn product_patch_keeps_unset_fields_and_rechecks_alarm() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let admin = ctx.user("adm@grupo.ec", UserRole::Admin, true, branch).await;
        let p = ctx.product("LLAV-1", Brand::Jetour, ProductCategory::Merchandising, 50, 10).await;

        let updated = ctx
            .catalog
            .update_product(
                &admin,
                p.id,
                ProductUpdate {
                    stock: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stock, 4);
        assert_eq!(updated.name, p.name);
        assert_eq!(updated.min_stock, 10);

        // 4 <= 10: la edición directa de stock también dispara la alarma.
        let unresolved = ctx.alerts.list_alerts(Some(false)).await.unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].product_id, p.id);
    }

    #[tokio::test]
    async fn pack_bom_replacement_is_destructive() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let admin = ctx.user("adm@grupo.ec", UserRole::Admin, true, branch).await;
        let a = ctx.product("BOM-A", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;
        let b = ctx.product("BOM-B", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;
        let c = ctx.product("BOM-C", Brand::Jac, ProductCategory::Merchandising, 10, 0).await;

        let pack = ctx
            .catalog
            .create_pack(
                &admin,
                "Kit Lanzamiento",
                "Kit de lanzamiento JAC",
                Brand::Jac,
                true,
                &[
                    PackItemInput { product_id: a.id, quantity: 1 },
                    PackItemInput { product_id: b.id, quantity: 2 },
                ],
            )
            .await
            .unwrap();

        // Reemplazo completo: el BOM nuevo no conserva nada del anterior.
        ctx.catalog
            .update_pack(
                &admin,
                pack.id,
                PackUpdate {
                    items: Some(vec![PackItemInput { product_id: c.id, quantity: 5 }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let items = ctx.catalog.get_pack_items(pack.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, c.id);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].product_sku, "BOM-C");
    }

    #[tokio::test]
    async fn pack_listing_enriches_components_and_tolerates_deleted_products() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;
        let admin = ctx.user("adm@grupo.ec", UserRole::Admin, true, branch).await;
        let a = ctx.product("EN-A", Brand::Karry, ProductCategory::Merchandising, 7, 2).await;
        let b = ctx.product("EN-B", Brand::Karry, ProductCategory::Merchandising, 3, 1).await;
        ctx.pack("Kit Karry", true, &[(a.id, 1), (b.id, 4)]).await;
        ctx.pack("Kit Inactivo", false, &[(a.id, 1)]).await;

        ctx.catalog.delete_product(&admin, b.id).await.unwrap();

        let active = ctx.catalog.list_packs(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].item_count, 2);

        let dangling = active[0].items.iter().find(|i| i.product_id == b.id).unwrap();
        assert_eq!(dangling.product_name, "Eliminado");
        assert_eq!(dangling.current_stock, 0);

        let all = ctx.catalog.list_packs(false).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
