use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, LoginView};
use super::{ApiError, AppState, redirect_found, validation};
use crate::services::{AuthError, AuthenticatedUser};
use crate::session::{SESSION_COOKIE, SessionCodec};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(rename = "loginType", default)]
    pub login_type: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(rename = "redirectTo", default)]
    pub redirect_to: String,
}

// ============================================================================
// Session helpers
// ============================================================================

/// The user id carried by the request's session cookie, if any.
pub fn user_id_from_session(codec: &SessionCodec, jar: &CookieJar) -> Option<i32> {
    codec.decode(jar.get(SESSION_COOKIE).map(|cookie| cookie.value()))
}

/// Resolve the session's user id or unwind to a login redirect that carries
/// the original path, so the user returns here after authenticating.
pub fn require_user_id(
    codec: &SessionCodec,
    jar: &CookieJar,
    original_path: &str,
) -> Result<i32, ApiError> {
    user_id_from_session(codec, jar).ok_or_else(|| ApiError::LoginRequired {
        redirect_to: original_path.to_string(),
    })
}

/// The logged-in user, looked up from the session cookie.
///
/// A session pointing at a user record that no longer exists is stale: the
/// cookie is cleared and no user is reported. A store failure is transient
/// and propagates instead of silently logging the user out.
pub async fn current_user(
    state: &AppState,
    jar: CookieJar,
) -> Result<(Option<AuthenticatedUser>, CookieJar), ApiError> {
    let codec = state.session();

    let Some(user_id) = user_id_from_session(codec, &jar) else {
        // A cookie that fails to decode is dead weight; clear it.
        let jar = if jar.get(SESSION_COOKIE).is_some() {
            jar.add(codec.clear_cookie())
        } else {
            jar
        };
        return Ok((None, jar));
    };

    match state.store().find_user_by_id(user_id).await? {
        Some(user) => Ok((
            Some(AuthenticatedUser {
                id: user.id,
                username: user.username,
            }),
            jar,
        )),
        None => {
            tracing::warn!("Session references missing user {user_id}, clearing cookie");
            Ok((None, jar.add(codec.clear_cookie())))
        }
    }
}

/// Issue a session for the user and redirect to their destination.
fn create_user_session(
    codec: &SessionCodec,
    jar: CookieJar,
    user_id: i32,
    redirect_to: &str,
) -> Result<Response, ApiError> {
    let token = codec
        .issue(user_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let jar = jar.add(codec.cookie(token));
    Ok((jar, redirect_found(redirect_to)).into_response())
}

fn bad_request(body: String) -> Response {
    (StatusCode::BAD_REQUEST, Html(body)).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let redirect_to = query.redirect_to.unwrap_or_default();

    Html(pages::login_page(&LoginView {
        redirect_to: &redirect_to,
        ..Default::default()
    }))
}

/// POST /login
/// Combined login/register action, keyed on the `loginType` field.
pub async fn login_action(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let redirect_to = validation::validate_redirect_url(&form.redirect_to).to_string();

    if form.login_type.is_empty() || form.username.is_empty() || form.password.is_empty() {
        return Ok(bad_request(pages::login_page(&LoginView {
            form_error: Some("Bad form submission"),
            ..Default::default()
        })));
    }

    let username_error = validation::validate_username(&form.username);
    let password_error = validation::validate_password(&form.password);

    let view = LoginView {
        login_type: &form.login_type,
        username: &form.username,
        password: &form.password,
        redirect_to: &redirect_to,
        username_error,
        password_error,
        form_error: None,
    };

    if username_error.is_some() || password_error.is_some() {
        return Ok(bad_request(pages::login_page(&view)));
    }

    match form.login_type.as_str() {
        "login" => match state.auth().login(&form.username, &form.password).await {
            Ok(user) => create_user_session(state.session(), jar, user.id, &redirect_to),
            Err(AuthError::InvalidCredentials) => Ok(bad_request(pages::login_page(&LoginView {
                form_error: Some("Username or Password is incorrect"),
                ..view
            }))),
            Err(e) => Err(e.into()),
        },

        "register" => {
            let existing = state.store().find_user_by_username(&form.username).await?;
            if existing.is_some() {
                return Ok(bad_request(pages::login_page(&LoginView {
                    form_error: Some("Username is already in use"),
                    ..view
                })));
            }

            match state.auth().register(&form.username, &form.password).await {
                Ok(user) => create_user_session(state.session(), jar, user.id, &redirect_to),
                // Lost the race against a concurrent registration; the
                // unique index caught it.
                Err(AuthError::UsernameTaken) => Ok(bad_request(pages::login_page(&LoginView {
                    form_error: Some("Username is already in use"),
                    ..view
                }))),
                Err(e) => Err(e.into()),
            }
        }

        _ => Ok(bad_request(pages::login_page(&LoginView {
            form_error: Some("Invalid Login type"),
            ..view
        }))),
    }
}

/// POST /logout
/// Destroy the session and return home.
pub async fn logout_action(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar.add(state.session().clear_cookie());
    (jar, redirect_found("/")).into_response()
}

/// GET /logout
pub async fn logout_page() -> Response {
    redirect_found("/")
}
