use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Taxonomía de errores del dominio + fallas de infraestructura.
// El frontend muestra el mensaje tal cual, así que las variantes de negocio
// llevan su texto en español.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Autenticación / directorio ---
    #[error("No autenticado.")]
    Unauthenticated,

    #[error("Cuenta no aprobada o inactiva.")]
    NotApproved,

    #[error("E-mail o contraseña inválidos.")]
    InvalidCredentials,

    #[error("Token de autenticación inválido o ausente.")]
    InvalidToken,

    #[error("El correo ya está registrado.")]
    EmailAlreadyExists,

    #[error("Usuario no encontrado.")]
    UserNotFound,

    #[error("Sucursal no encontrada.")]
    BranchNotFound,

    #[error("No tienes permisos para realizar esta acción.")]
    PermissionDenied,

    #[error("No tienes permisos para cambiar el rol de un usuario.")]
    RoleEscalationDenied,

    #[error("No puedes eliminar tu propia cuenta.")]
    SelfDeleteDenied,

    // --- Catálogo ---
    #[error("Ya existe un producto con SKU: {0}")]
    DuplicateSku(String),

    #[error("Producto no encontrado en el sistema.")]
    ProductNotFound,

    #[error("Pack no encontrado o inactivo.")]
    PackNotFound,

    // --- Motor de retiros ---
    #[error("No se seleccionaron productos para el retiro.")]
    EmptySelection,

    #[error("Los artículos de Exhibición requieren autorización de un Supervisor o Admin.")]
    AuthorizationRequired,

    #[error("Autorización denegada. Solo un Supervisor o Admin puede aprobar este retiro.")]
    AuthorizationDenied,

    #[error(
        "Stock insuficiente para \"{product}\": disponible {available}, solicitado {requested}. Transacción cancelada."
    )]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Retiro no encontrado.")]
    WithdrawalNotFound,

    #[error("Este retiro ya ha sido revertido.")]
    AlreadyReverted,

    // --- Alertas ---
    #[error("Alerta no encontrada.")]
    AlertNotFound,

    // --- Infraestructura ---
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::EmptySelection => StatusCode::BAD_REQUEST,

            AppError::Unauthenticated | AppError::InvalidCredentials | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }

            AppError::NotApproved
            | AppError::AuthorizationRequired
            | AppError::AuthorizationDenied
            | AppError::PermissionDenied
            | AppError::RoleEscalationDenied
            | AppError::SelfDeleteDenied => StatusCode::FORBIDDEN,

            AppError::UserNotFound
            | AppError::BranchNotFound
            | AppError::ProductNotFound
            | AppError::PackNotFound
            | AppError::WithdrawalNotFound
            | AppError::AlertNotFound => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::DuplicateSku(_)
            | AppError::InsufficientStock { .. }
            | AppError::AlreadyReverted => StatusCode::CONFLICT,

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // La validación devuelve todos los detalles, campo por campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Uno o más campos son inválidos.",
                "details": details,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status_code();

        // Los errores de infraestructura se loguean con detalle y salen con
        // un mensaje genérico; el tracing conserva la causa real.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Error interno del servidor: {}", self);
            let body = Json(json!({ "error": "Ocurrió un error inesperado." }));
            return (status, body).into_response();
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
