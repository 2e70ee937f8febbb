use super::{AppError, WidgetAppState};
use crate::error::{ExchangeError, FetchError};
use crate::media::{self, MediaOutcome};
use crate::oauth;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// `/iws/...` query parameters
#[derive(Deserialize)]
pub struct MediaQuery {
    user_id: Option<String>,
}

/// OAuth callback query parameters
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    error: Option<String>,
    error_reason: Option<String>,
    error_description: Option<String>,
}

/// GET /iws/...?user_id=<id>
///
/// Renders the user's recent media. A user with no stored credential gets
/// an empty 200 response.
pub async fn recent_media(
    State(state): State<Arc<WidgetAppState>>,
    Query(query): Query<MediaQuery>,
) -> Result<Response, AppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'user_id' parameter".to_string()))?;

    debug!(user_id = %user_id, "Recent media requested");

    let outcome = media::fetch_recent_media(&state.client, &state.store, &user_id)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, error = %e, "Media fetch failed");
            fetch_failed(e)
        })?;

    match outcome {
        // Unauthenticated users see nothing rather than an error
        MediaOutcome::NoCredential => Ok(StatusCode::OK.into_response()),
        MediaOutcome::Gallery(items) => Ok(Html(state.templates.gallery(&items)?).into_response()),
    }
}

/// GET /iw/...?code=<code>
///
/// Provider redirect target. Exchanges the code, stores the credential and
/// greets the user.
pub async fn oauth_callback(
    State(state): State<Arc<WidgetAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Response, AppError> {
    if let Some(error) = callback.error {
        let description = callback
            .error_description
            .or(callback.error_reason)
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!(error = %error, description = %description, "OAuth authorization failed");
        return Err(AppError::BadRequest(format!(
            "OAuth authorization failed: {} - {}",
            error, description
        )));
    }

    let code = callback
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'code' parameter".to_string()))?;

    let response = oauth::complete_exchange(&state.client, &state.store, &code)
        .await
        .map_err(|e| {
            error!(error = %e, "Token exchange failed");
            exchange_failed(e)
        })?;

    info!(
        user_id = %response.user.id,
        username = %response.user.username,
        "OAuth flow completed successfully"
    );

    Ok(Html(state.templates.welcome(&response)?).into_response())
}

/// Every other path: ask the user to authorize the widget.
pub async fn authenticate_prompt(
    State(state): State<Arc<WidgetAppState>>,
) -> Result<Html<String>, AppError> {
    let authorize_url = state.config.provider.authorize_url();
    Ok(Html(state.templates.prompt(&authorize_url)?))
}

fn exchange_failed(err: ExchangeError) -> AppError {
    AppError::ServerError(format!("Failed to exchange authorization code: {}", err))
}

fn fetch_failed(err: FetchError) -> AppError {
    AppError::ServerError(format!("Failed to fetch recent media: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_callback_deserialization() {
        let query = "code=auth_code_123";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.code, Some("auth_code_123".to_string()));
        assert_eq!(callback.error, None);

        let query = "error=access_denied&error_reason=user_denied&error_description=The+user+denied+your+request.";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.error, Some("access_denied".to_string()));
        assert_eq!(callback.error_reason, Some("user_denied".to_string()));
        assert_eq!(
            callback.error_description,
            Some("The user denied your request.".to_string())
        );
        assert_eq!(callback.code, None);
    }

    #[test]
    fn test_media_query_ignores_other_parameters() {
        let query: MediaQuery = serde_urlencoded::from_str("user_id=42&theme=dark").unwrap();
        assert_eq!(query.user_id, Some("42".to_string()));
    }
}
