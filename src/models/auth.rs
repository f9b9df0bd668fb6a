// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Roles fijos del grupo. El orden importa para la lectura, no para el código:
// un admin puede todo, un supervisor autoriza retiros de Exhibición y edita
// asesores, un advisor solo opera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Supervisor,
    Advisor,
}

impl UserRole {
    /// Roles que pueden autorizar retiros de artículos de Exhibición.
    pub fn can_authorize_display_items(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Supervisor)
    }
}

// Un usuario del directorio. Las credenciales viven en su propia tabla.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub branch_id: Uuid,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

// Credencial local (hash bcrypt). Borrar el usuario borra esta fila
// en la misma transacción.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// Respuesta de autenticación con el token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID del usuario)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
