// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Credential, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: SqlitePool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            pool,
        }
    }

    /// Alta de cuenta. El usuario queda `approved = false` hasta que un
    /// admin lo apruebe; mientras tanto puede iniciar sesión pero no
    /// transaccionar. Usuario y credencial caen en la misma transacción.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
        branch_id: Uuid,
    ) -> Result<User, AppError> {
        // El hashing no toca la base: fuera de la transacción, y en un
        // hilo aparte porque bcrypt es deliberadamente lento.
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        // El chequeo de unicidad corre dentro de la misma transacción
        // que el alta.
        if self
            .user_repo
            .find_by_email(&mut *tx, email)
            .await?
            .is_some()
        {
            return Err(AppError::EmailAlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            branch_id,
            approved: false,
            created_at: Utc::now(),
        };
        self.user_repo.insert_user(&mut *tx, &user).await?;

        let credential = Credential {
            id: Uuid::new_v4(),
            user_id: user.id,
            password_hash: hashed_password,
            created_at: Utc::now(),
        };
        self.user_repo
            .insert_credential(&mut *tx, &credential)
            .await?;

        tx.commit().await?;

        tracing::info!(email = %user.email, "usuario registrado, pendiente de aprobación");
        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let credential = self
            .user_repo
            .find_credential_by_user(user.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = credential.password_hash.clone();

        // La verificación también corre en un hilo aparte.
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falla en la task de verificación: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Un token de un usuario ya borrado deja de valer.
        self.user_repo
            .find_by_id(&self.pool, token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestCtx;

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;

        let user = ctx
            .auth
            .register_user("Juan", "juan@grupo.ec", "secreta1", UserRole::Advisor, branch)
            .await
            .unwrap();
        assert!(!user.approved);

        let token = ctx.auth.login_user("juan@grupo.ec", "secreta1").await.unwrap();
        let resolved = ctx.auth.validate_token(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let err = ctx
            .auth
            .login_user("juan@grupo.ec", "equivocada")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let ctx = TestCtx::new().await;
        let branch = ctx.branch("Matriz").await;

        ctx.auth
            .register_user("Ana", "ana@grupo.ec", "secreta1", UserRole::Advisor, branch)
            .await
            .unwrap();
        let err = ctx
            .auth
            .register_user("Ana Dos", "ana@grupo.ec", "secreta2", UserRole::Advisor, branch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let ctx = TestCtx::new().await;
        let err = ctx.auth.validate_token("no-es-un-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
