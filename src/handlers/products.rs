// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole, SupervisorOrAdmin},
    },
    models::catalog::{Brand, ProductCategory, ProductUpdate},
};

fn validate_not_negative(val: i64) -> Result<(), ValidationError> {
    if val < 0 {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor no puede ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub brand: Option<Brand>,
    pub category: Option<ProductCategory>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    params(ProductFilter),
    security(("api_jwt" = [])),
    responses((status = 200, description = "Catálogo filtrado"))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_service
        .list_products(filter.brand, filter.category)
        .await?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/sku/{sku}",
    tag = "Inventory",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Producto"), (status = 404, description = "No existe"))
)]
pub async fn get_product_by_sku(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(sku): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.get_product_by_sku(&sku).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: alta de producto
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "El SKU es obligatorio."))]
    pub sku: String,

    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    pub brand: Brand,
    pub category: ProductCategory,

    #[validate(custom(function = validate_not_negative))]
    pub stock: i64,

    #[validate(custom(function = validate_not_negative))]
    pub min_stock: i64,

    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    security(("api_jwt" = [])),
    responses((status = 201, description = "Producto creado"), (status = 409, description = "SKU duplicado"))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<SupervisorOrAdmin>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .catalog_service
        .create_product(
            &user.0,
            &payload.sku,
            &payload.name,
            payload.brand,
            payload.category,
            payload.stock,
            payload.min_stock,
            payload.description,
            payload.image_url,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    request_body = ProductUpdate,
    security(("api_jwt" = [])),
    responses((status = 200, description = "Producto actualizado"))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<SupervisorOrAdmin>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProductUpdate>,
) -> Result<impl IntoResponse, AppError> {
    // El parche es tipado pero el rango se valida a mano, igual que en el alta.
    if let Some(stock) = update.stock {
        if let Err(e) = validate_not_negative(stock) {
            let mut errors = validator::ValidationErrors::new();
            errors.add("stock", e);
            return Err(AppError::ValidationError(errors));
        }
    }
    if let Some(min_stock) = update.min_stock {
        if let Err(e) = validate_not_negative(min_stock) {
            let mut errors = validator::ValidationErrors::new();
            errors.add("minStock", e);
            return Err(AppError::ValidationError(errors));
        }
    }

    let product = app_state
        .catalog_service
        .update_product(&user.0, id, update)
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Producto eliminado"))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_product(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
