// src/config.rs

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{
        AlertRepository, AuditRepository, BranchRepository, CatalogRepository, DashboardRepository,
        UserRepository, WithdrawalRepository,
    },
    services::{
        alert_service::AlertService, auth::AuthService, catalog_service::CatalogService,
        dashboard_service::DashboardService, directory_service::DirectoryService,
        report_service::ReportService, withdrawal_service::WithdrawalService,
    },
};

// El estado compartido accesible desde toda la aplicación.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub directory_service: DirectoryService,
    pub withdrawal_service: WithdrawalService,
    pub alert_service: AlertService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub audit_repo: AuditRepository,
}

impl AppState {
    // Carga la configuración desde el entorno y abre la base.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:mims.db".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET debe estar definida"))?;

        // WAL + busy_timeout: los escritores se serializan esperando en vez
        // de fallar al primer conflicto.
        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| anyhow::anyhow!("DATABASE_URL inválida: {e}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("Conexión con la base de datos establecida (SQLite WAL)");

        Ok(Self::from_pool(db_pool, jwt_secret))
    }

    // Cablea repositorios y servicios sobre una pool ya abierta. Los tests
    // entran por acá con una base en memoria.
    pub fn from_pool(db_pool: SqlitePool, jwt_secret: String) -> Self {
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());
        let branch_repo = BranchRepository::new(db_pool.clone());
        let withdrawal_repo = WithdrawalRepository::new(db_pool.clone());
        let alert_repo = AlertRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let alert_service = AlertService::new(
            db_pool.clone(),
            alert_repo,
            catalog_repo.clone(),
            audit_repo.clone(),
        );
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(
            db_pool.clone(),
            catalog_repo.clone(),
            audit_repo.clone(),
            alert_service.clone(),
        );
        let directory_service = DirectoryService::new(
            db_pool.clone(),
            user_repo.clone(),
            branch_repo.clone(),
            audit_repo.clone(),
        );
        let withdrawal_service = WithdrawalService::new(
            db_pool.clone(),
            catalog_repo.clone(),
            user_repo.clone(),
            branch_repo.clone(),
            withdrawal_repo.clone(),
            audit_repo.clone(),
            alert_service.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo);
        let report_service = ReportService::new(
            db_pool.clone(),
            withdrawal_repo,
            branch_repo,
            user_repo,
            catalog_repo,
        );

        Self {
            db_pool,
            jwt_secret,
            auth_service,
            catalog_service,
            directory_service,
            withdrawal_service,
            alert_service,
            dashboard_service,
            report_service,
            audit_repo,
        }
    }
}
