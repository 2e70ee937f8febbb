//! OAuth 2.0 authorization code exchange.
//!
//! Flow:
//! 1. User follows the authorize link from the prompt page
//! 2. User approves the widget on the provider's site
//! 3. Provider redirects to `/iw/...?code=...`
//! 4. Exchange the code for a token, store `(user.id, access_token)`
//! 5. Greet the user with their profile

use crate::credentials::{CredentialStore, PutOutcome};
use crate::error::ExchangeError;
use crate::provider::{OAuthResponse, ProviderClient};

/// Complete the authorization code grant and persist the resulting credential.
///
/// The code is passed to the provider untouched. No deduplication: each
/// callback performs its own round trip.
pub async fn complete_exchange(
    client: &ProviderClient,
    store: &CredentialStore,
    code: &str,
) -> Result<OAuthResponse, ExchangeError> {
    let response = client.exchange_code(code).await?;

    if response.access_token.is_empty() || response.user.id.is_empty() {
        return Err(ExchangeError::MissingToken);
    }

    let user_id = response.user.id.clone();
    let access_token = response.access_token.clone();
    let store = store.clone();
    let outcome =
        tokio::task::spawn_blocking(move || store.put(&user_id, &access_token)).await??;

    match outcome {
        PutOutcome::Inserted => tracing::info!(
            user_id = %response.user.id,
            username = %response.user.username,
            "Stored new credential"
        ),
        PutOutcome::Unchanged => tracing::debug!(
            user_id = %response.user.id,
            "Credential already stored"
        ),
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::StorageError;
    use mockito::Server;
    use tempfile::TempDir;

    fn setup(base_url: String) -> (TempDir, ProviderClient, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("data.db"));
        store.initialize().unwrap();
        let client = ProviderClient::new(ProviderConfig {
            api_base_url: base_url,
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "https://widget.example.com/iw/".to_string(),
            request_timeout_seconds: 5,
        })
        .unwrap();
        (dir, client, store)
    }

    #[tokio::test]
    async fn test_exchange_stores_credential() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok1","user":{"id":"42","username":"alice"}}"#)
            .create_async()
            .await;

        let (_dir, client, store) = setup(server.url());
        let response = complete_exchange(&client, &store, "abc123").await.unwrap();

        assert_eq!(response.user.username, "alice");
        assert_eq!(store.get("42").unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn test_repeated_exchange_is_idempotent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok1","user":{"id":"42","username":"alice"}}"#)
            .expect(2)
            .create_async()
            .await;

        let (_dir, client, store) = setup(server.url());
        complete_exchange(&client, &store, "abc123").await.unwrap();
        complete_exchange(&client, &store, "abc123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(store.get("42").unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn test_new_token_for_existing_user_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok2","user":{"id":"42"}}"#)
            .create_async()
            .await;

        let (_dir, client, store) = setup(server.url());
        store.put("42", "tok1").unwrap();

        let err = complete_exchange(&client, &store, "abc123").await.unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Storage(StorageError::ConstraintViolation(_))
        ));
        assert_eq!(store.get("42").unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn test_response_without_token_not_stored() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"user":{"id":"42"}}"#)
            .create_async()
            .await;

        let (_dir, client, store) = setup(server.url());
        let err = complete_exchange(&client, &store, "abc123").await.unwrap_err();

        assert!(matches!(err, ExchangeError::MissingToken));
        assert!(store.get("42").unwrap().is_none());
    }
}
