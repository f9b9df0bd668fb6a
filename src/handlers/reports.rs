// src/handlers/reports.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::catalog::Brand,
};

#[utoipa::path(
    get,
    path = "/api/reports/withdrawals-by-reason",
    tag = "Reports",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Conteo de retiros por razón"))
)]
pub async fn withdrawals_by_reason(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.report_service.withdrawals_by_reason().await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/reports/withdrawals-by-branch",
    tag = "Reports",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Conteo de retiros por sucursal"))
)]
pub async fn withdrawals_by_branch(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.report_service.withdrawals_by_branch().await?;
    Ok((StatusCode::OK, Json(rows)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditReportPayload {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub brand: Option<Brand>,
    pub branch_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/reports/audit",
    tag = "Reports",
    request_body = AuditReportPayload,
    security(("api_jwt" = [])),
    responses((status = 200, description = "Filas y resumen del rango pedido"))
)]
pub async fn audit_report(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<AuditReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .report_service
        .audit_report(
            payload.start_date,
            payload.end_date,
            payload.brand,
            payload.branch_id,
        )
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
