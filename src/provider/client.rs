use super::envelope::{self, MediaEnvelope, OAuthResponse};
use crate::config::ProviderConfig;
use crate::error::{ExchangeError, FetchError};
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

/// Number of media items requested per page view
pub const RECENT_MEDIA_COUNT: u32 = 6;

/// HTTP client for the photo provider's token and media endpoints.
///
/// One attempt per call. Both calls are bounded by the configured request
/// timeout.
#[derive(Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    http_client: Client,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("instawidget/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Trade an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthResponse, ExchangeError> {
        let token_url = self.config.token_url();
        tracing::debug!("Exchanging authorization code for token at {}", token_url);

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&token_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Network(e.without_url()))?;

        if !status.is_success() {
            return Err(ExchangeError::Status {
                status,
                message: envelope::error_message(&body),
            });
        }

        Ok(envelope::decode_oauth_response(&body)?)
    }

    /// Fetch the most recent media for `user_id`, authorized by `access_token`.
    pub async fn recent_media(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<MediaEnvelope, FetchError> {
        let url = self.config.recent_media_url(user_id);
        let count = RECENT_MEDIA_COUNT.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[("count", count.as_str()), ("access_token", access_token)])
            .send()
            .await
            // The URL carries the access token
            .map_err(|e| FetchError::Network(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.without_url()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                message: envelope::error_message(&body),
            });
        }

        let media = envelope::decode_media_envelope(&body)?;

        // The envelope can report failure even when the transport says 200
        if let Some(code) = media.meta.code {
            if code != StatusCode::OK.as_u16() {
                return Err(FetchError::Status {
                    status: StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
                    message: envelope::error_message(&body),
                });
            }
        }

        Ok(media)
    }
}
