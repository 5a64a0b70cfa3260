//! Domain service for credential handling.
//!
//! Handles login and registration against the credential store. Session
//! issuing lives at the web layer, where the cookie jar is available.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username is already in use")]
    UsernameTaken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Identity DTO for responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the user's identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or
    /// a wrong password; the two cases are indistinguishable to the caller.
    async fn login(&self, username: &str, password: &str)
    -> Result<AuthenticatedUser, AuthError>;

    /// Hashes the password and creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] when the store's unique index
    /// rejects the username. Callers may pre-check availability, but this
    /// is the atomic backstop.
    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError>;
}
