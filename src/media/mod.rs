//! Authenticated recent-media fetch.
//!
//! Loads the stored token for a user, asks the provider for their latest
//! media and reduces the envelope to what the gallery template needs.

use crate::credentials::CredentialStore;
use crate::error::FetchError;
use crate::provider::{MediaEnvelope, ProviderClient};
use serde::Serialize;

/// One gallery entry: the permalink and the image shown for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub link: String,
    /// Empty when the item has no thumbnail tier
    pub image_url: String,
}

/// Result of a media fetch.
///
/// "No credential" and "nothing to show" are kept apart so callers can
/// decide how to present an unauthenticated user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaOutcome {
    /// No token stored for this user id; the provider was not called
    NoCredential,
    Gallery(Vec<Thumbnail>),
}

/// Fetch and reduce the recent media of `user_id`.
pub async fn fetch_recent_media(
    client: &ProviderClient,
    store: &CredentialStore,
    user_id: &str,
) -> Result<MediaOutcome, FetchError> {
    let lookup_store = store.clone();
    let lookup_id = user_id.to_string();
    let token = tokio::task::spawn_blocking(move || lookup_store.get(&lookup_id)).await??;

    let Some(access_token) = token else {
        tracing::info!(user_id = %user_id, "No stored credential, nothing to render");
        return Ok(MediaOutcome::NoCredential);
    };

    let envelope = client.recent_media(user_id, &access_token).await?;
    let thumbnails = thumbnails(&envelope);

    tracing::debug!(user_id = %user_id, items = thumbnails.len(), "Fetched recent media");
    Ok(MediaOutcome::Gallery(thumbnails))
}

/// One entry per media item, in envelope order.
pub fn thumbnails(envelope: &MediaEnvelope) -> Vec<Thumbnail> {
    envelope
        .data
        .iter()
        .map(|item| Thumbnail {
            link: item.link.clone(),
            image_url: item.thumbnail_url().to_string(),
        })
        .collect()
}
