use super::WidgetConfig;
use std::path::PathBuf;

/// Environment variable holding the config file path
pub const CONFIG_PATH_VAR: &str = "INSTAWIDGET_CONFIG";

/// Default config file path when `INSTAWIDGET_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "instawidget.toml";

/// Resolve the config file path from the environment.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl WidgetConfig {
    /// Apply env var overrides on top of file values.
    ///
    /// Values that fail to parse are ignored and the existing value is kept.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("INSTAWIDGET_ADDRESS") {
            self.server.address = v;
        }
        if let Some(v) = lookup("INSTAWIDGET_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Some(v) = lookup("INSTAWIDGET_NEWDB") {
            if let Ok(b) = v.parse::<bool>() {
                self.server.reinitialize_store = b;
            }
        }
        if let Some(v) = lookup("INSTAWIDGET_CLIENT_ID") {
            self.provider.client_id = v;
        }
        if let Some(v) = lookup("INSTAWIDGET_CLIENT_SECRET") {
            self.provider.client_secret = v;
        }
        if let Some(v) = lookup("INSTAWIDGET_REDIRECT_URI") {
            self.provider.redirect_uri = v;
        }
        if let Some(v) = lookup("INSTAWIDGET_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = WidgetConfig::default();
        config.apply_overrides(lookup_from(&[
            ("INSTAWIDGET_ADDRESS", "0.0.0.0"),
            ("INSTAWIDGET_PORT", "8443"),
            ("INSTAWIDGET_NEWDB", "true"),
            ("INSTAWIDGET_CLIENT_SECRET", "from-env"),
            ("INSTAWIDGET_DATA_DIR", "/srv/widget"),
        ]));

        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.server.port, 8443);
        assert!(config.server.reinitialize_store);
        assert_eq!(config.provider.client_secret, "from-env");
        assert_eq!(config.paths.data_dir, PathBuf::from("/srv/widget"));
    }

    #[test]
    fn test_unparseable_values_ignored() {
        let mut config = WidgetConfig::default();
        config.apply_overrides(lookup_from(&[
            ("INSTAWIDGET_PORT", "not-a-port"),
            ("INSTAWIDGET_NEWDB", "yes please"),
        ]));

        assert_eq!(config.server.port, 9999);
        assert!(!config.server.reinitialize_store);
    }
}
