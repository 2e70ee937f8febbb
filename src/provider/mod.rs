//! Photo provider integration: wire shapes and the HTTP client.

mod client;
pub mod envelope;

pub use client::{ProviderClient, RECENT_MEDIA_COUNT};
pub use envelope::{MediaEnvelope, MediaItem, OAuthResponse, User};
