// src/handlers/packs.rs

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
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, SupervisorOrAdmin},
    },
    models::catalog::{Brand, PackItemInput, PackUpdate},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PackFilter {
    pub active_only: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/packs",
    tag = "Packs",
    params(PackFilter),
    security(("api_jwt" = [])),
    responses((status = 200, description = "Packs con su BOM enriquecido"))
)]
pub async fn list_packs(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<PackFilter>,
) -> Result<impl IntoResponse, AppError> {
    let packs = app_state
        .catalog_service
        .list_packs(filter.active_only.unwrap_or(false))
        .await?;

    Ok((StatusCode::OK, Json(packs)))
}

#[utoipa::path(
    get,
    path = "/api/packs/{id}/items",
    tag = "Packs",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Componentes del pack"))
)]
pub async fn get_pack_items(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.catalog_service.get_pack_items(id).await?;
    Ok((StatusCode::OK, Json(items)))
}

// ---
// Payload: alta de pack
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    pub description: String,
    pub brand: Brand,
    pub active: bool,

    #[validate(nested)]
    pub items: Vec<PackItemInput>,
}

#[utoipa::path(
    post,
    path = "/api/packs",
    tag = "Packs",
    request_body = CreatePackPayload,
    security(("api_jwt" = [])),
    responses((status = 201, description = "Pack creado"))
)]
pub async fn create_pack(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<SupervisorOrAdmin>,
    Json(payload): Json<CreatePackPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pack = app_state
        .catalog_service
        .create_pack(
            &user.0,
            &payload.name,
            &payload.description,
            payload.brand,
            payload.active,
            &payload.items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pack)))
}

#[utoipa::path(
    patch,
    path = "/api/packs/{id}",
    tag = "Packs",
    request_body = PackUpdate,
    security(("api_jwt" = [])),
    responses((status = 200, description = "Pack actualizado; si vino `items`, el BOM fue reemplazado"))
)]
pub async fn update_pack(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<SupervisorOrAdmin>,
    Path(id): Path<Uuid>,
    Json(update): Json<PackUpdate>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(items) = &update.items {
        for item in items {
            item.validate()?;
        }
    }

    let pack = app_state
        .catalog_service
        .update_pack(&user.0, id, update)
        .await?;

    Ok((StatusCode::OK, Json(pack)))
}
