//! Provider JSON shapes.
//!
//! Every field below the top level is optional on the wire: unknown fields
//! are ignored, and an absent or `null` field decodes as its empty value.
//! Only a body that is not a JSON object fails to decode.

use crate::error::MalformedResponse;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Resolution tier used for widget thumbnails
pub const THUMBNAIL_TIER: &str = "thumbnail";

/// Profile summary attached to OAuth responses and media items.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_picture: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
}

/// Token endpoint response.
///
/// The token is never serialized, so the value can be handed to templates.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthResponse {
    #[serde(deserialize_with = "null_as_default", skip_serializing)]
    pub access_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: User,
}

/// Envelope metadata. `code` mirrors the HTTP status on success.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub code: Option<u16>,
    #[serde(deserialize_with = "null_as_default")]
    pub error_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub error_message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(deserialize_with = "null_as_default")]
    pub next_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub next_max_id: String,
}

/// One size variant of an image.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageVariant {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub width: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub height: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: User,
    /// Keyed by resolution tier, e.g. "thumbnail", "standard_resolution"
    #[serde(deserialize_with = "null_as_default")]
    pub images: HashMap<String, ImageVariant>,
}

impl MediaItem {
    /// URL of the thumbnail tier, or `""` when the item has none.
    pub fn thumbnail_url(&self) -> &str {
        self.images
            .get(THUMBNAIL_TIER)
            .map(|variant| variant.url.as_str())
            .unwrap_or("")
    }
}

/// Recent media listing response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
    #[serde(deserialize_with = "null_as_default")]
    pub pagination: Pagination,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<MediaItem>,
}

/// Error body returned by the token endpoint on failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OAuthErrorBody {
    #[serde(deserialize_with = "null_as_default")]
    error_type: String,
    #[serde(deserialize_with = "null_as_default")]
    error_message: String,
}

pub fn decode_oauth_response(body: &[u8]) -> Result<OAuthResponse, MalformedResponse> {
    decode_object(body)
}

pub fn decode_media_envelope(body: &[u8]) -> Result<MediaEnvelope, MalformedResponse> {
    decode_object(body)
}

/// Derived structs also accept JSON arrays, so the top level is checked first.
fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, MalformedResponse> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde_json::Error::custom("expected a JSON object at the top level").into());
    }
    Ok(serde_json::from_value(value)?)
}

/// Best-effort human readable message from a provider error body.
///
/// Understands both the bare OAuth error shape and the `meta` envelope;
/// falls back to the raw body text.
pub fn error_message(body: &[u8]) -> String {
    if let Ok(err) = serde_json::from_slice::<OAuthErrorBody>(body) {
        if !err.error_message.is_empty() {
            return describe(&err.error_type, &err.error_message);
        }
    }
    if let Ok(envelope) = decode_media_envelope(body) {
        if !envelope.meta.error_message.is_empty() {
            return describe(&envelope.meta.error_type, &envelope.meta.error_message);
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "empty response body".to_string()
    } else {
        text
    }
}

fn describe(error_type: &str, message: &str) -> String {
    if error_type.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", error_type, message)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// User ids show up as strings from the API but as numbers in some payloads.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(s)) => s,
        Some(Id::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
