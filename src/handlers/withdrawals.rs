// src/handlers/withdrawals.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::withdrawal::{WithdrawalLineInput, WithdrawalReason},
};

// ---
// Payload: registro de retiro
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWithdrawalPayload {
    pub branch_id: Uuid,
    pub reason: WithdrawalReason,
    pub notes: Option<String>,

    // Obligatorio cuando el retiro incluye artículos de Exhibición.
    pub authorized_by_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Debes seleccionar al menos un producto o pack."), nested)]
    pub items: Vec<WithdrawalLineInput>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/withdrawals",
    tag = "Withdrawals",
    request_body = RegisterWithdrawalPayload,
    security(("api_jwt" = [])),
    responses(
        (status = 201, description = "Retiro registrado"),
        (status = 409, description = "Stock insuficiente; nada fue descontado"),
        (status = 403, description = "Falta autorización para artículos de Exhibición")
    )
)]
pub async fn register_withdrawal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<RegisterWithdrawalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let receipt = app_state
        .withdrawal_service
        .register_withdrawal(
            &user.0,
            payload.branch_id,
            payload.reason,
            payload.notes,
            payload.authorized_by_id,
            &payload.items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalFilter {
    pub branch_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/withdrawals",
    tag = "Withdrawals",
    params(WithdrawalFilter),
    security(("api_jwt" = [])),
    responses((status = 200, description = "Historial enriquecido, más reciente primero"))
)]
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<WithdrawalFilter>,
) -> Result<impl IntoResponse, AppError> {
    let withdrawals = app_state
        .withdrawal_service
        .list_withdrawals(filter.branch_id, filter.limit)
        .await?;

    Ok((StatusCode::OK, Json(withdrawals)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/withdrawals/{id}/revert",
    tag = "Withdrawals",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Stock restituido y retiro marcado como revertido"),
        (status = 409, description = "Ya había sido revertido")
    )
)]
pub async fn revert_withdrawal(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .withdrawal_service
        .revert_withdrawal(&user.0, id)
        .await?;

    Ok(StatusCode::OK)
}
