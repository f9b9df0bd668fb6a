// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardStats,
};

#[utoipa::path(
    get,
    path = "/api/inventory/dashboard",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Indicadores del inventario", body = DashboardStats))
)]
pub async fn get_dashboard_stats(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.get_stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}
