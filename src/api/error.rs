use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use super::pages;
use crate::services::AuthError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// Unauthenticated at an action: unwinds to a redirect to the login
    /// page, carrying the original path so the user lands back where they
    /// started after authenticating.
    LoginRequired { redirect_to: String },

    /// Unauthenticated at a loader: rendered as a 401 page with a login link.
    Unauthorized(String),

    /// Authenticated but not allowed. Distinct from `Unauthorized`.
    Forbidden(String),

    ValidationError(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::LoginRequired { redirect_to } => {
                write!(f, "Login required (from {})", redirect_to)
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::LoginRequired { redirect_to } => {
                let location = format!("/login?redirectTo={}", urlencoding::encode(&redirect_to));
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Html(pages::error_page(&msg))).into_response()
            }
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                Html(pages::unauthorized_page(&msg)),
            )
                .into_response(),
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, Html(pages::error_page(&msg))).into_response()
            }
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Html(pages::error_page(&msg))).into_response()
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pages::error_page(
                        "Something unexpected went wrong. Sorry about that.",
                    )),
                )
                    .into_response()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pages::error_page(
                        "Something unexpected went wrong. Sorry about that.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::ValidationError("Username or Password is incorrect".to_string())
            }
            AuthError::UsernameTaken => {
                ApiError::ValidationError("Username is already in use".to_string())
            }
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
