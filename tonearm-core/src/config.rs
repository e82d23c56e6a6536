use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{catalog::CatalogSettings, store::StoreOptions, tc};

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Write(std::io::Error),
}
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "Failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {e}"),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {e}"),
            ConfigError::Write(e) => write!(f, "Failed to write config: {e}"),
        }
    }
}
impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub store: Store,
}
impl Config {
    pub const FILENAME: &str = "tonearm.toml";

    /// Load the config at `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(ConfigError::Parse),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Write)?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Whether real client credentials have been filled in.
    pub fn has_credentials(&self) -> bool {
        let defaults = Catalog::default();
        !self.catalog.client_id.is_empty()
            && !self.catalog.client_secret.is_empty()
            && self.catalog.client_id != defaults.client_id
            && self.catalog.client_secret != defaults.client_secret
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            search_market: self.catalog.search_market.clone(),
            top_tracks_market: self.catalog.top_tracks_market.clone(),
            artist_album_groups: self.catalog.artist_album_groups.clone(),
            artist_album_limit: self.catalog.artist_album_limit,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            search_limit: self.store.search_limit,
            home_query: self.store.home_query.clone(),
            home_limit: self.store.home_limit,
            supersede_stale_requests: self.store.supersede_stale_requests,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Catalog {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
    pub search_market: String,
    pub top_tracks_market: String,
    pub artist_album_groups: String,
    pub artist_album_limit: u32,
}
impl Default for Catalog {
    fn default() -> Self {
        let settings = CatalogSettings::default();
        Self {
            client_id: "YOUR_CLIENT_ID".to_string(),
            client_secret: "YOUR_CLIENT_SECRET".to_string(),
            token_url: tc::Client::DEFAULT_TOKEN_URL.to_string(),
            api_url: tc::Client::DEFAULT_API_URL.to_string(),
            search_market: settings.search_market,
            top_tracks_market: settings.top_tracks_market,
            artist_album_groups: settings.artist_album_groups,
            artist_album_limit: settings.artist_album_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Store {
    pub search_limit: u32,
    pub home_query: String,
    pub home_limit: u32,
    pub supersede_stale_requests: bool,
}
impl Default for Store {
    fn default() -> Self {
        let options = StoreOptions::default();
        Self {
            search_limit: options.search_limit,
            home_query: options.home_query,
            home_limit: options.home_limit,
            supersede_stale_requests: options.supersede_stale_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            client_id = "abc"
            client_secret = "xyz"

            [store]
            supersede_stale_requests = true
            "#,
        )
        .unwrap();

        assert!(config.has_credentials());
        assert_eq!(config.catalog.token_url, tc::Client::DEFAULT_TOKEN_URL);
        assert_eq!(config.catalog_settings(), CatalogSettings::default());
        assert_eq!(
            config.store_options(),
            StoreOptions {
                supersede_stale_requests: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_default_config_has_no_credentials() {
        assert!(!Config::default().has_credentials());
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = std::env::temp_dir().join(format!("tonearm-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.toml");
        assert_eq!(Config::load(&missing).unwrap(), Config::default());

        let malformed = dir.join("malformed.toml");
        std::fs::write(&malformed, "[store]\nsearch_limit = \"many\"").unwrap();
        assert!(matches!(
            Config::load(&malformed),
            Err(ConfigError::Parse(_))
        ));

        let saved = dir.join("saved.toml");
        let mut config = Config::default();
        config.store.home_query = "jazz".to_string();
        config.save(&saved).unwrap();
        assert_eq!(Config::load(&saved).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
