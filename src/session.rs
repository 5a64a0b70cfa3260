//! Stateless signed session tokens.
//!
//! A session is a signed token held entirely by the client in the
//! `__session` cookie; the server keeps no session table. Authenticity
//! comes from the HS256 signature keyed by the process-wide secret, so a
//! tampered or forged cookie decodes to "no user" rather than an error.

use anyhow::{Context, Result};
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session cookie name
pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// User id, stringified
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
    max_age_seconds: u64,
    secure: bool,
}

impl SessionCodec {
    #[must_use]
    pub const fn new(secret: String, max_age_seconds: u64, secure: bool) -> Self {
        Self {
            secret,
            max_age_seconds,
            secure,
        }
    }

    /// Sign a session token for a user.
    pub fn issue(&self, user_id: i32) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + i64::try_from(self.max_age_seconds).unwrap_or(i64::MAX),
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign session token")
    }

    /// Decode a session token back to the user id it was issued for.
    ///
    /// An absent, expired, tampered, or otherwise invalid token yields
    /// `None` ("logged out"), never an error.
    #[must_use]
    pub fn decode(&self, token: Option<&str>) -> Option<i32> {
        let token = token?;

        let data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .ok()?;

        data.claims.sub.parse().ok()
    }

    /// The session cookie carrying a freshly issued token.
    #[must_use]
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .max_age(time::Duration::seconds(
                i64::try_from(self.max_age_seconds).unwrap_or(i64::MAX),
            ))
            .build()
    }

    /// A cookie that makes the client discard its session.
    #[must_use]
    pub fn clear_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new("test-session-secret".to_string(), 86400, false)
    }

    #[test]
    fn test_issue_and_decode() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        assert_eq!(codec.decode(Some(&token)), Some(42));
    }

    #[test]
    fn test_absent_token_is_logged_out() {
        assert_eq!(codec().decode(None), None);
    }

    #[test]
    fn test_garbage_token_is_logged_out() {
        assert_eq!(codec().decode(Some("not-a-token")), None);
        assert_eq!(codec().decode(Some("")), None);
    }

    #[test]
    fn test_wrong_secret_is_logged_out() {
        let token = codec().issue(42).unwrap();
        let other = SessionCodec::new("different-secret".to_string(), 86400, false);
        assert_eq!(other.decode(Some(&token)), None);
    }

    #[test]
    fn test_tampered_token_is_logged_out() {
        let codec = codec();
        let token = codec.issue(42).unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = parts[1].replace('a', "b");
        let tampered = parts.join(".");

        assert_eq!(codec.decode(Some(&tampered)), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = codec().cookie("tok".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));

        let secure = SessionCodec::new("s".to_string(), 86400, true);
        assert_eq!(secure.cookie("tok".to_string()).secure(), Some(true));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = codec().clear_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
