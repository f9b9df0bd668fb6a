// src/app.rs
//
// Armado del router. Separado de main para que los tests de integración
// levanten exactamente la misma aplicación sobre su propia base.

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_middleware};

pub fn build_app(app_state: AppState) -> Router {
    // Rutas públicas de autenticación
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Directorio de usuarios (protegido)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/", get(handlers::users::list_users))
        .route("/pending", get(handlers::users::list_pending_users))
        .route("/{id}/approve", post(handlers::users::approve_user))
        .route("/{id}/reject", post(handlers::users::reject_user))
        .route(
            "/{id}",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let branch_routes = Router::new()
        .route(
            "/",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route("/{id}", patch(handlers::branches::update_branch))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let inventory_routes = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/products/sku/{sku}", get(handlers::products::get_product_by_sku))
        .route(
            "/products/{id}",
            patch(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/withdrawals",
            get(handlers::withdrawals::list_withdrawals)
                .post(handlers::withdrawals::register_withdrawal),
        )
        .route(
            "/withdrawals/{id}/revert",
            post(handlers::withdrawals::revert_withdrawal),
        )
        .route("/alerts", get(handlers::alerts::list_alerts))
        .route("/alerts/{id}/resolve", post(handlers::alerts::resolve_alert))
        .route("/dashboard", get(handlers::dashboard::get_dashboard_stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let pack_routes = Router::new()
        .route(
            "/",
            get(handlers::packs::list_packs).post(handlers::packs::create_pack),
        )
        .route("/{id}", patch(handlers::packs::update_pack))
        .route("/{id}/items", get(handlers::packs::get_pack_items))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let report_routes = Router::new()
        .route(
            "/withdrawals-by-reason",
            get(handlers::reports::withdrawals_by_reason),
        )
        .route(
            "/withdrawals-by-branch",
            get(handlers::reports::withdrawals_by_branch),
        )
        .route("/audit", post(handlers::reports::audit_report))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let audit_routes = Router::new()
        .route("/", get(handlers::audit::list_audit_log))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/branches", branch_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/packs", pack_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/audit", audit_routes)
        .with_state(app_state)
}
