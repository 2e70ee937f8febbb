pub mod env;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete widget configuration
///
/// Loaded once at startup and shared by reference with every component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Run the store initializer even if the database file already exists
    #[serde(default)]
    pub reinitialize_store: bool,
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,
    #[serde(default)]
    pub tls_key: Option<PathBuf>,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            reinitialize_store: false,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl ServerConfig {
    /// Socket address to listen on. `address` must be an IPv4 or IPv6 literal.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .address
            .parse()
            .with_context(|| format!("server.address '{}' is not an IP address", self.address))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Photo provider (OAuth client) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Must match the redirect URI registered with the provider exactly
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    "https://api.instagram.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Build the authorization URL users are sent to from the prompt page
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/oauth/authorize/?client_id={}&redirect_uri={}&response_type=code",
            self.base(),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri)
        )
    }

    /// OAuth token exchange endpoint
    pub fn token_url(&self) -> String {
        format!("{}/oauth/access_token", self.base())
    }

    /// Recent media endpoint for a single user
    pub fn recent_media_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/users/{}/media/recent/",
            self.base(),
            urlencoding::encode(user_id)
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    fn base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

/// On-disk layout: templates, static files and the credential database
/// all live under one data directory.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl PathsConfig {
    pub fn template_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.data_dir.join("static")
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("data.db")
    }
}

impl WidgetConfig {
    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.provider.client_id.is_empty() {
            bail!("provider.client_id is required");
        }
        if self.provider.client_secret.is_empty() {
            bail!("provider.client_secret is required");
        }
        if self.provider.redirect_uri.is_empty() {
            bail!("provider.redirect_uri is required");
        }
        if self.provider.request_timeout_seconds == 0 {
            bail!("provider.request_timeout_seconds must be greater than zero");
        }
        if self.server.tls_cert.is_none() || self.server.tls_key.is_none() {
            bail!("server.tls_cert and server.tls_key are required (TLS only)");
        }
        self.server.listen_addr()?;
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is an error.
pub fn load_config(path: &Path) -> Result<WidgetConfig> {
    if !path.exists() {
        return Ok(WidgetConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: WidgetConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
