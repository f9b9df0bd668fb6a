// src/models/directory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::UserRole;

// Una sucursal del grupo. `manager_id` es referencia débil a users.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub location_details: String,
    pub active: bool,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Parche tipado para sucursal.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub location_details: Option<String>,
    pub active: Option<bool>,
    pub manager_id: Option<Uuid>,
}

// Sucursal con el nombre del encargado resuelto para la UI.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchView {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub location_details: String,
    pub active: bool,
    pub manager_id: Option<Uuid>,
    pub manager_name: String,
}

// Parche tipado para usuario. Qué campos puede tocar cada rol lo decide
// el servicio de directorio, no este struct.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub branch_id: Option<Uuid>,
    pub approved: Option<bool>,
}
