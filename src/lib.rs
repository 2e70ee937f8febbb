// Process configuration
pub mod config;

// Error taxonomy
pub mod error;

// Credential persistence
pub mod credentials;

// Provider wire shapes and HTTP client
pub mod provider;

// Authorization code exchange
pub mod oauth;

// Recent media fetch
pub mod media;

// HTML templates
pub mod render;

// HTTP surface
pub mod api;
