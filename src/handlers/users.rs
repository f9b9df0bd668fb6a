// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::directory::UserUpdate,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuarios aprobados"))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.directory_service.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    get,
    path = "/api/users/pending",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Cuentas a la espera de aprobación"))
)]
pub async fn list_pending_users(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.directory_service.list_pending_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/approve",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Cuenta aprobada"))
)]
pub async fn approve_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.directory_service.approve_user(&user.0, id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/reject",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Cuenta rechazada y eliminada"))
)]
pub async fn reject_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.directory_service.reject_user(&user.0, id).await?;
    Ok(StatusCode::OK)
}

// Sin guardián de rol: las reglas campo a campo (admin todo, supervisor
// solo nombre/sucursal de asesores) viven en el servicio de directorio.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UserUpdate,
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuario actualizado"))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .directory_service
        .update_user(&user.0, id, update)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Usuario eliminado junto con sus credenciales"))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.directory_service.delete_user(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
