// src/test_support.rs
//
// Fixtures compartidas por los tests de servicios: base SQLite en memoria
// con las mismas migraciones que producción.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use crate::{
    config::AppState,
    db::{BranchRepository, CatalogRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        catalog::{Brand, Pack, PackItem, Product, ProductCategory},
        directory::Branch,
        withdrawal::WithdrawalLineInput,
    },
    services::{
        alert_service::AlertService, auth::AuthService, catalog_service::CatalogService,
        dashboard_service::DashboardService, directory_service::DirectoryService,
        report_service::ReportService, withdrawal_service::WithdrawalService,
    },
};

pub struct TestCtx {
    pub pool: SqlitePool,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub directory: DirectoryService,
    pub withdrawals: WithdrawalService,
    pub alerts: AlertService,
    pub dashboard: DashboardService,
    pub reports: ReportService,
}

impl TestCtx {
    pub async fn new() -> Self {
        // Una sola conexión: cada test ve su propia base en memoria.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("no se pudo abrir la base en memoria");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("falla al migrar la base de test");

        let state = AppState::from_pool(pool.clone(), "secreto-de-test".to_string());
        Self {
            pool,
            auth: state.auth_service,
            catalog: state.catalog_service,
            directory: state.directory_service,
            withdrawals: state.withdrawal_service,
            alerts: state.alert_service,
            dashboard: state.dashboard_service,
            reports: state.report_service,
        }
    }

    pub async fn branch(&self, name: &str) -> Uuid {
        let branch = Branch {
            id: Uuid::new_v4(),
            name: name.to_string(),
            city: "Ambato".to_string(),
            location_details: "Av. Los Guaytambos y Av. Atahualpa".to_string(),
            active: true,
            manager_id: None,
            created_at: Utc::now(),
        };
        BranchRepository::new(self.pool.clone())
            .insert(&self.pool, &branch)
            .await
            .unwrap();
        branch.id
    }

    pub async fn user(&self, email: &str, role: UserRole, approved: bool, branch_id: Uuid) -> User {
        let name = email.split('@').next().unwrap_or("usuario").to_string();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email: email.to_string(),
            role,
            branch_id,
            approved,
            created_at: Utc::now(),
        };
        UserRepository::new(self.pool.clone())
            .insert_user(&self.pool, &user)
            .await
            .unwrap();
        user
    }

    pub async fn product(
        &self,
        sku: &str,
        brand: Brand,
        category: ProductCategory,
        stock: i64,
        min_stock: i64,
    ) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            sku: sku.to_string(),
            name: format!("Producto {sku}"),
            brand,
            category,
            stock,
            min_stock,
            description: None,
            image_url: None,
            created_at: Utc::now(),
        };
        CatalogRepository::new(self.pool.clone())
            .insert_product(&self.pool, &product)
            .await
            .unwrap();
        product
    }

    pub async fn pack(&self, name: &str, active: bool, items: &[(Uuid, i64)]) -> Uuid {
        let repo = CatalogRepository::new(self.pool.clone());
        let pack = Pack {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} de prueba"),
            brand: Brand::Jac,
            active,
            created_at: Utc::now(),
        };
        repo.insert_pack(&self.pool, &pack).await.unwrap();
        for (product_id, quantity) in items {
            repo.insert_pack_item(
                &self.pool,
                &PackItem {
                    id: Uuid::new_v4(),
                    pack_id: pack.id,
                    product_id: *product_id,
                    quantity: *quantity,
                },
            )
            .await
            .unwrap();
        }
        pack.id
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn credential_exists(&self, user_id: Uuid) -> bool {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        count > 0
    }
}

pub fn line_product(product_id: Uuid, quantity: i64) -> WithdrawalLineInput {
    WithdrawalLineInput {
        product_id: Some(product_id),
        pack_id: None,
        quantity,
    }
}

pub fn line_pack(pack_id: Uuid, quantity: i64) -> WithdrawalLineInput {
    WithdrawalLineInput {
        product_id: None,
        pack_id: Some(pack_id),
        quantity,
    }
}
