//! HTTP surface.
//!
//! | Path              | Handler                                  |
//! |-------------------|------------------------------------------|
//! | `/iws/...`        | recent media gallery for `?user_id=`     |
//! | `/iw/...`         | OAuth redirect callback with `?code=`    |
//! | `/static/...`     | files under the static directory         |
//! | anything else     | "please authenticate" prompt             |

mod static_files;
mod widget;

use crate::config::WidgetConfig;
use crate::credentials::CredentialStore;
use crate::provider::ProviderClient;
use crate::render::{TemplateError, TemplateRenderer};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Request failures surfaced to the client as plain text.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    ServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, error_message).into_response()
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        tracing::error!(error = %err, "Template rendering failed");
        AppError::ServerError(err.to_string())
    }
}

/// Shared application state
#[derive(Clone)]
pub struct WidgetAppState {
    pub config: Arc<WidgetConfig>,
    pub store: CredentialStore,
    pub client: ProviderClient,
    pub templates: Arc<TemplateRenderer>,
}

impl WidgetAppState {
    /// Wire every component from one configuration.
    pub fn new(config: Arc<WidgetConfig>) -> anyhow::Result<Self> {
        let store = CredentialStore::new(config.paths.database_file());
        let client = ProviderClient::new(config.provider.clone())?;
        let templates = Arc::new(TemplateRenderer::new(config.paths.template_dir()));
        Ok(Self {
            config,
            store,
            client,
            templates,
        })
    }
}

/// Create the widget router
pub fn create_router(state: WidgetAppState) -> Router {
    Router::new()
        .route("/iws/", get(widget::recent_media))
        .route("/iws/*rest", get(widget::recent_media))
        .route("/iw/", get(widget::oauth_callback))
        .route("/iw/*rest", get(widget::oauth_callback))
        .route("/static/", get(static_files::serve_static))
        .route("/static/*path", get(static_files::serve_static))
        .fallback(widget::authenticate_prompt)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
