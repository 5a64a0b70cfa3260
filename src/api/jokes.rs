use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, JokeFormView};
use super::{ApiError, AppState, auth, redirect_found, validation};

/// Recent jokes shown in the sidebar of every jokes page
const RECENT_JOKES: u64 = 5;

#[derive(Deserialize)]
pub struct JokeForm {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct JokeActionForm {
    #[serde(default)]
    pub intent: String,
}

/// GET /jokes
/// The jokes layout with a random joke in the outlet.
pub async fn jokes_index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (user, jar) = auth::current_user(&state, jar).await?;
    let recent = state.store().list_jokes_page(0, RECENT_JOKES).await?;

    let Some(joke) = state.store().random_joke().await? else {
        let page = pages::jokes_page(user.as_ref(), &recent, &pages::no_jokes_section());
        return Ok((jar, (StatusCode::NOT_FOUND, Html(page))).into_response());
    };

    let page = pages::jokes_page(user.as_ref(), &recent, &pages::random_joke_section(&joke));
    Ok((jar, Html(page)).into_response())
}

/// GET /jokes/{id}
pub async fn show_joke(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (user, jar) = auth::current_user(&state, jar).await?;

    let joke = state
        .store()
        .find_joke_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Huh? What the heck is \"{id}\"")))?;

    let is_owner = user.as_ref().is_some_and(|u| u.id == joke.author_id);

    let recent = state.store().list_jokes_page(0, RECENT_JOKES).await?;
    let page = pages::jokes_page(user.as_ref(), &recent, &pages::joke_section(&joke, is_owner));
    Ok((jar, Html(page)).into_response())
}

/// GET /jokes/new
/// The submission form. Unauthenticated viewers get a 401 page with a login
/// link rather than a redirect; only the submit action redirects.
pub async fn new_joke_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (user, jar) = auth::current_user(&state, jar).await?;

    if user.is_none() {
        return Err(ApiError::Unauthorized(
            "You must be logged in to create a joke.".to_string(),
        ));
    }

    let recent = state.store().list_jokes_page(0, RECENT_JOKES).await?;
    let page = pages::jokes_page(
        user.as_ref(),
        &recent,
        &pages::new_joke_section(&JokeFormView::default()),
    );
    Ok((jar, Html(page)).into_response())
}

/// POST /jokes/new
pub async fn create_joke(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<JokeForm>,
) -> Result<Response, ApiError> {
    let user_id = auth::require_user_id(state.session(), &jar, "/jokes/new")?;

    if form.name.is_empty() || form.content.is_empty() {
        let view = JokeFormView {
            form_error: Some("Bad form submission"),
            ..Default::default()
        };
        return render_joke_form(&state, jar, &view).await;
    }

    let name_error = validation::validate_joke_name(&form.name);
    let content_error = validation::validate_joke_content(&form.content);

    if name_error.is_some() || content_error.is_some() {
        let view = JokeFormView {
            name: &form.name,
            content: &form.content,
            name_error,
            content_error,
            form_error: None,
        };
        return render_joke_form(&state, jar, &view).await;
    }

    let joke = state
        .store()
        .create_joke(user_id, &form.name, &form.content)
        .await?;

    Ok(redirect_found(&format!("/jokes/{}", joke.id)))
}

/// POST /jokes/{id}
/// Form actions on a single joke. `intent=delete` removes it, owner only:
/// a valid session that does not own the joke is forbidden, which is a
/// different condition than having no session at all.
pub async fn joke_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    jar: CookieJar,
    Form(form): Form<JokeActionForm>,
) -> Result<Response, ApiError> {
    if form.intent != "delete" {
        return Err(ApiError::validation(format!(
            "The intent {} is not supported",
            form.intent
        )));
    }

    let user_id = auth::require_user_id(state.session(), &jar, &format!("/jokes/{id}"))?;

    let joke = state
        .store()
        .find_joke_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Can't delete what does not exist"))?;

    if joke.author_id != user_id {
        return Err(ApiError::Forbidden(
            "Pssh, nice try. That's not your joke".to_string(),
        ));
    }

    state.store().delete_joke(id).await?;
    tracing::info!("User {} deleted joke {}", user_id, id);

    Ok(redirect_found("/jokes"))
}

/// Re-render the submission form with validation errors, values preserved.
async fn render_joke_form(
    state: &AppState,
    jar: CookieJar,
    view: &JokeFormView<'_>,
) -> Result<Response, ApiError> {
    let (user, jar) = auth::current_user(state, jar).await?;
    let recent = state.store().list_jokes_page(0, RECENT_JOKES).await?;

    let page = pages::jokes_page(user.as_ref(), &recent, &pages::new_joke_section(view));
    Ok((jar, (StatusCode::BAD_REQUEST, Html(page))).into_response())
}
