use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub web: WebConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Upstream catalog listing endpoint; query parameters are appended verbatim.
    pub base_url: String,
    /// Base URL for per-game detail pages.
    pub detail_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Content store root; entity and upload endpoints hang off this.
    pub base_url: String,
    /// Optional bearer token for the store API.
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of gallery screenshots imported per game.
    pub gallery_limit: usize,
    /// Image-size token substituted into templated screenshot URLs.
    pub screenshot_format: String,
    /// Rating code used when the detail page carries no rating icon.
    pub default_rating: String,
    /// Fixed publish timestamp override; when absent, games are published "now".
    /// Exists so deterministic runs can be configured.
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                base_url: "https://catalog.gog.com/v1/catalog".to_string(),
                detail_base_url: "https://www.gog.com/game".to_string(),
            },
            store: StoreConfig {
                base_url: "http://localhost:1337".to_string(),
                api_token: None,
            },
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            sync: SyncConfig {
                gallery_limit: 5,
                screenshot_format: "product_card_v2_mobile_slider_639".to_string(),
                default_rating: "BR0".to_string(),
                publish_at: None,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
