// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Las cuatro marcas que maneja el grupo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum Brand {
    #[sqlx(rename = "JAC")]
    #[serde(rename = "JAC")]
    Jac,
    Jetour,
    Karry,
    Corp,
}

// Exhibición agrupa los activos permanentes de punto de venta (POP):
// retirarlos requiere autorización de un supervisor o admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum ProductCategory {
    Merchandising,
    #[sqlx(rename = "Exhibición")]
    #[serde(rename = "Exhibición")]
    Exhibicion,
    Oficina,
}

// Un artículo en stock. `sku` es único e inmutable; `stock` nunca baja de cero.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub brand: Brand,
    pub category: ProductCategory,
    pub stock: i64,
    pub min_stock: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Parche tipado para producto. SKU, marca y categoría son inmutables
// después de la creación.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub brand: Brand,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// Componente del BOM de un pack.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackItem {
    pub id: Uuid,
    pub pack_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}

// Parche tipado para pack. Si `items` viene, el BOM completo se reemplaza
// (borrar todo + insertar todo, nunca un merge parcial).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub items: Option<Vec<PackItemInput>>,
}

#[derive(Debug, Clone, Deserialize, validator::Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackItemInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "La cantidad debe ser mayor a cero."))]
    pub quantity: i64,
}

// --- Vistas enriquecidas (join de lectura, no lógica de negocio) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackItemView {
    pub id: Uuid,
    pub pack_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub product_name: String,
    pub product_sku: String,
    pub current_stock: i64,
    pub min_stock: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub brand: Brand,
    pub active: bool,
    pub items: Vec<PackItemView>,
    pub item_count: usize,
}
