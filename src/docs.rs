// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::list_pending_users,
        handlers::users::approve_user,
        handlers::users::reject_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Branches ---
        handlers::branches::list_branches,
        handlers::branches::create_branch,
        handlers::branches::update_branch,

        // --- Inventory ---
        handlers::products::list_products,
        handlers::products::get_product_by_sku,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Packs ---
        handlers::packs::list_packs,
        handlers::packs::get_pack_items,
        handlers::packs::create_pack,
        handlers::packs::update_pack,

        // --- Withdrawals ---
        handlers::withdrawals::register_withdrawal,
        handlers::withdrawals::list_withdrawals,
        handlers::withdrawals::revert_withdrawal,

        // --- Alerts ---
        handlers::alerts::list_alerts,
        handlers::alerts::resolve_alert,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard_stats,

        // --- Reports ---
        handlers::reports::withdrawals_by_reason,
        handlers::reports::withdrawals_by_branch,
        handlers::reports::audit_report,

        // --- Audit ---
        handlers::audit::list_audit_log,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::AuthResponse,
            handlers::auth::RegisterUserPayload,
            handlers::auth::LoginUserPayload,

            // --- Directory ---
            models::directory::Branch,
            models::directory::BranchView,
            models::directory::BranchUpdate,
            models::directory::UserUpdate,
            handlers::branches::CreateBranchPayload,

            // --- Catalog ---
            models::catalog::Brand,
            models::catalog::ProductCategory,
            models::catalog::Product,
            models::catalog::ProductUpdate,
            models::catalog::Pack,
            models::catalog::PackItem,
            models::catalog::PackItemInput,
            models::catalog::PackItemView,
            models::catalog::PackView,
            models::catalog::PackUpdate,
            handlers::products::CreateProductPayload,
            handlers::packs::CreatePackPayload,

            // --- Withdrawals ---
            models::withdrawal::WithdrawalReason,
            models::withdrawal::WithdrawalStatus,
            models::withdrawal::Withdrawal,
            models::withdrawal::WithdrawalItem,
            models::withdrawal::WithdrawalLineInput,
            models::withdrawal::WithdrawalReceipt,
            models::withdrawal::WithdrawalItemView,
            models::withdrawal::WithdrawalView,
            handlers::withdrawals::RegisterWithdrawalPayload,

            // --- Alerts ---
            models::alert::AlertType,
            models::alert::Alert,
            models::alert::AlertView,

            // --- Dashboard ---
            models::dashboard::StockByBrand,
            models::dashboard::DashboardStats,

            // --- Reports ---
            models::report::ReasonCount,
            models::report::BranchCount,
            models::report::AuditReportRow,
            models::report::AuditReportSummary,
            models::report::AuditReportDateRange,
            models::report::AuditReport,
            handlers::reports::AuditReportPayload,

            // --- Audit ---
            models::audit::AuditLogEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Users", description = "Directorio de usuarios y aprobaciones"),
        (name = "Branches", description = "Sucursales del grupo"),
        (name = "Inventory", description = "Catálogo de productos promocionales"),
        (name = "Packs", description = "Kits y su lista de componentes"),
        (name = "Withdrawals", description = "Registro y reversa de retiros de stock"),
        (name = "Alerts", description = "Alertas de stock bajo/agotado"),
        (name = "Dashboard", description = "Indicadores del inventario"),
        (name = "Reports", description = "Agregaciones de solo lectura sobre el historial"),
        (name = "Audit", description = "Log de auditoría")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
