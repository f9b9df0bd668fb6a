// src/services/directory_service.rs

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, BranchRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        directory::{Branch, BranchUpdate, BranchView, UserUpdate},
    },
};

#[derive(Clone)]
pub struct DirectoryService {
    pool: SqlitePool,
    user_repo: UserRepository,
    branch_repo: BranchRepository,
    audit_repo: AuditRepository,
}

impl DirectoryService {
    pub fn new(
        pool: SqlitePool,
        user_repo: UserRepository,
        branch_repo: BranchRepository,
        audit_repo: AuditRepository,
    ) -> Self {
        Self {
            pool,
            user_repo,
            branch_repo,
            audit_repo,
        }
    }

    // ---
    // Sucursales
    // ---

    pub async fn list_branches(&self) -> Result<Vec<BranchView>, AppError> {
        let branches = self.branch_repo.find_all().await?;

        let mut views = Vec::with_capacity(branches.len());
        for branch in branches {
            let manager_name = match branch.manager_id {
                Some(id) => self
                    .user_repo
                    .find_by_id(&self.pool, id)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_else(|| "Sin asignar".to_string()),
                None => "Sin asignar".to_string(),
            };
            views.push(BranchView {
                id: branch.id,
                name: branch.name,
                city: branch.city,
                location_details: branch.location_details,
                active: branch.active,
                manager_id: branch.manager_id,
                manager_name,
            });
        }
        Ok(views)
    }

    pub async fn create_branch(
        &self,
        actor: &User,
        name: &str,
        city: &str,
        location_details: &str,
        active: bool,
        manager_id: Option<Uuid>,
    ) -> Result<Branch, AppError> {
        let mut tx = self.pool.begin().await?;

        let branch = Branch {
            id: Uuid::new_v4(),
            name: name.to_string(),
            city: city.to_string(),
            location_details: location_details.to_string(),
            active,
            manager_id,
            created_at: Utc::now(),
        };
        self.branch_repo.insert(&mut *tx, &branch).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "create_branch",
                &format!("Sucursal creada: {}", branch.name),
                Some("branches"),
                Some(branch.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(branch)
    }

    pub async fn update_branch(
        &self,
        actor: &User,
        id: Uuid,
        update: BranchUpdate,
    ) -> Result<Branch, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut branch = self
            .branch_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        if let Some(name) = update.name {
            branch.name = name;
        }
        if let Some(city) = update.city {
            branch.city = city;
        }
        if let Some(location_details) = update.location_details {
            branch.location_details = location_details;
        }
        if let Some(active) = update.active {
            branch.active = active;
        }
        if let Some(manager_id) = update.manager_id {
            branch.manager_id = Some(manager_id);
        }
        self.branch_repo.update(&mut *tx, &branch).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "update_branch",
                &format!("Sucursal actualizada: {}", branch.name),
                Some("branches"),
                Some(branch.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(branch)
    }

    // ---
    // Usuarios
    // ---

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_approved().await
    }

    pub async fn list_pending_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_pending().await
    }

    pub async fn approve_user(&self, actor: &User, user_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let mut user = self
            .user_repo
            .find_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        user.approved = true;
        self.user_repo.update_user(&mut *tx, &user).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "APPROVE_USER",
                &format!("Aprobado acceso para {}", user.email),
                Some("users"),
                Some(user.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // Rechazar borra la cuenta pendiente, credenciales incluidas.
    pub async fn reject_user(&self, actor: &User, user_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .find_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.user_repo
            .delete_credentials_for_user(&mut *tx, user.id)
            .await?;
        self.user_repo.delete_user(&mut *tx, user.id).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "REJECT_USER",
                &format!("Rechazado y eliminado {}", user.email),
                Some("users"),
                Some(user.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Reglas de edición campo a campo:
    /// - un admin edita cualquier campo de cualquier usuario;
    /// - un supervisor solo nombre/sucursal de asesores, y nunca el rol;
    /// - un asesor no edita a nadie.
    pub async fn update_user(
        &self,
        actor: &User,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut user = self
            .user_repo
            .find_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        match actor.role {
            UserRole::Admin => {}
            UserRole::Supervisor => {
                if user.role != UserRole::Advisor {
                    return Err(AppError::AuthorizationDenied);
                }
                if update.role.is_some_and(|r| r != user.role) {
                    return Err(AppError::RoleEscalationDenied);
                }
                if update.approved.is_some() {
                    return Err(AppError::AuthorizationDenied);
                }
            }
            UserRole::Advisor => return Err(AppError::AuthorizationDenied),
        }

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(branch_id) = update.branch_id {
            user.branch_id = branch_id;
        }
        if let Some(approved) = update.approved {
            user.approved = approved;
        }
        self.user_repo.update_user(&mut *tx, &user).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "update_user",
                &format!("Usuario actualizado: {}", user.email),
                Some("users"),
                Some(user.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    // Nadie se borra a sí mismo; borrar revoca credenciales en cascada.
    pub async fn delete_user(&self, actor: &User, user_id: Uuid) -> Result<(), AppError> {
        if actor.id == user_id {
            return Err(AppError::SelfDeleteDenied);
        }

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .find_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.user_repo
            .delete_credentials_for_user(&mut *tx, user.id)
            .await?;
        self.user_repo.delete_user(&mut *tx, user.id).await?;

        self.audit_repo
            .append(
                &mut *tx,
                Some(actor.id),
                "DELETE_USER",
                &format!("Usuario eliminado: {}", user.email),
                Some("users"),
                Some(user.id.to_string()),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
