use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::AuthService;
use crate::session::SessionCodec;
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod jokes;
mod observability;
mod pages;
mod validation;

pub use error::ApiError;

pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn session(&self) -> &SessionCodec {
        &self.shared.session
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth
    }
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);

    Ok(Arc::new(AppState {
        shared,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(auth::login_page).post(auth::login_action))
        .route("/logout", get(auth::logout_page).post(auth::logout_action))
        .route("/jokes", get(jokes::jokes_index))
        .route(
            "/jokes/new",
            get(jokes::new_joke_page).post(jokes::create_joke),
        )
        .route(
            "/jokes/{id}",
            get(jokes::show_joke).post(jokes::joke_action),
        )
        .route("/metrics", get(observability::get_metrics))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn home() -> Html<String> {
    Html(pages::home_page())
}

/// A plain 302, the status the login/logout/create flows promise.
pub(crate) fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
