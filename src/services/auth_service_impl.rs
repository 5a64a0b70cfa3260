//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use sea_orm::SqlErr;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, AuthenticatedUser};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let is_valid = self
            .store
            .verify_user_password(username, password)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .find_user_by_username(username)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
        })
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let user = self
            .store
            .create_user(username, password, &self.security)
            .await
            .map_err(|e| {
                // The unique index on username is the backstop for the
                // caller's non-atomic availability pre-check.
                if let Some(db_err) = e.downcast_ref::<sea_orm::DbErr>()
                    && matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                {
                    AuthError::UsernameTaken
                } else {
                    AuthError::Database(e.to_string())
                }
            })?;

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
        })
    }
}
