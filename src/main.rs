use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use instawidget::api::{create_router, WidgetAppState};
use instawidget::config::{self, env::config_path};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "instawidget=info,tower_http=info".into()),
        )
        .init();

    let config_file = config_path();
    let mut config = config::load_config(&config_file)?;
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    info!(
        config_file = %config_file.display(),
        data_dir = %config.paths.data_dir.display(),
        "Configuration loaded"
    );

    let config = Arc::new(config);
    let state = WidgetAppState::new(Arc::clone(&config))?;

    // A missing database file always gets a fresh schema
    if config.server.reinitialize_store || !state.store.exists() {
        state
            .store
            .initialize()
            .context("Failed to initialize credential store")?;
        info!(path = %state.store.path().display(), "Credential store initialized");
    }

    let (cert, key) = match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert), Some(key)) => (cert, key),
        _ => anyhow::bail!("TLS certificate and key are required"),
    };
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate/key")?;

    let addr = config.server.listen_addr()?;

    info!(
        "Launching instawidget {} on https://{}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let router = create_router(state);
    axum_server::bind_rustls(addr, tls)
        .serve(router.into_make_service())
        .await
        .context("HTTPS server error")?;

    Ok(())
}
