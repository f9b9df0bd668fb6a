// src/handlers/alerts.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AlertFilter {
    pub resolved: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/alerts",
    tag = "Alerts",
    params(AlertFilter),
    security(("api_jwt" = [])),
    responses((status = 200, description = "Alertas con datos del producto resueltos"))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<AlertFilter>,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state.alert_service.list_alerts(filter.resolved).await?;
    Ok((StatusCode::OK, Json(alerts)))
}

// Las alertas nunca se resuelven solas: alguien tiene que venir acá.
#[utoipa::path(
    post,
    path = "/api/inventory/alerts/{id}/resolve",
    tag = "Alerts",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Alerta resuelta"))
)]
pub async fn resolve_alert(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.alert_service.resolve_alert(&user.0, id).await?;
    Ok(StatusCode::OK)
}
