// src/handlers/branches.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::directory::BranchUpdate,
};

#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Branches",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Sucursales con encargado resuelto"))
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let branches = app_state.directory_service.list_branches().await?;
    Ok((StatusCode::OK, Json(branches)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    #[validate(length(min = 1, message = "La ciudad es obligatoria."))]
    pub city: String,

    pub location_details: String,
    pub active: bool,
    pub manager_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Branches",
    request_body = CreateBranchPayload,
    security(("api_jwt" = [])),
    responses((status = 201, description = "Sucursal creada"))
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch = app_state
        .directory_service
        .create_branch(
            &user.0,
            &payload.name,
            &payload.city,
            &payload.location_details,
            payload.active,
            payload.manager_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    patch,
    path = "/api/branches/{id}",
    tag = "Branches",
    request_body = BranchUpdate,
    security(("api_jwt" = [])),
    responses((status = 200, description = "Sucursal actualizada"))
)]
pub async fn update_branch(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(update): Json<BranchUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let branch = app_state
        .directory_service
        .update_branch(&user.0, id, update)
        .await?;

    Ok((StatusCode::OK, Json(branch)))
}
