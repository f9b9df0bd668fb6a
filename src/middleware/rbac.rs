// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. El trait que define un requisito de rol
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// 2. El extractor (guardián). Corre después de `auth_middleware`, así que
/// el usuario ya está resuelto en las extensions.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::Unauthenticated)?;

        if !T::allows(user.role) {
            return Err(AppError::PermissionDenied);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LOS REQUISITOS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Admin)
    }
}

pub struct SupervisorOrAdmin;
impl RoleDef for SupervisorOrAdmin {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Admin | UserRole::Supervisor)
    }
}
