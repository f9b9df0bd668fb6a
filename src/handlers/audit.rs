// src/handlers/audit.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditFilter {
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/audit",
    tag = "Audit",
    params(AuditFilter),
    security(("api_jwt" = [])),
    responses((status = 200, description = "Log de auditoría, más reciente primero"))
)]
pub async fn list_audit_log(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<AuditFilter>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .audit_repo
        .find_recent(filter.limit.unwrap_or(100))
        .await?;

    Ok((StatusCode::OK, Json(entries)))
}
