//! Settings structures for mediapick configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::images::{ImageFilter, SelectConfig};

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub image: ImageSettings,
    pub search: SearchSettings,
    pub providers: Vec<ProviderConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            image: ImageSettings::default(),
            search: SearchSettings::default(),
            providers: default_providers(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (MEDIAPICK_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("MEDIAPICK_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("MEDIAPICK_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("MEDIAPICK_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("MEDIAPICK_IMAGE_PATH") {
            self.image.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("MEDIAPICK_SEARCH_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.search.timeout_ms = ms;
            }
        }
    }

    /// Get all enabled providers, in declaration order
    pub fn enabled_providers(&self) -> Vec<&ProviderConfig> {
        self.providers.iter().filter(|p| !p.disabled).collect()
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8081,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy for all outgoing requests
    pub proxy: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxy: None,
        }
    }
}

/// Best-image selection and persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Directory where cropped images are written
    pub path: PathBuf,
    /// Aggregation window for candidate images, in milliseconds
    pub select_timeout_ms: u64,
    /// Number of concurrent image fetchers
    pub workers: usize,
    /// Widest width/height ratio accepted as best
    pub max_ratio: f64,
    /// Narrowest width/height ratio accepted as best
    pub min_ratio: f64,
    /// Smallest pixel area accepted as best
    pub min_area: u64,
    /// Output crop width
    pub crop_width: u32,
    /// Output crop height
    pub crop_height: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/opt/mediapick/img"),
            select_timeout_ms: 500,
            workers: 4,
            max_ratio: 2.0,
            min_ratio: 0.5,
            min_area: 5000,
            crop_width: 460,
            crop_height: 160,
        }
    }
}

impl ImageSettings {
    /// Build the selection config handed to `select_best_image`
    pub fn select_config(&self) -> SelectConfig {
        SelectConfig {
            timeout: Duration::from_millis(self.select_timeout_ms),
            workers: self.workers.max(1),
            filter: ImageFilter {
                max_ratio: self.max_ratio,
                min_ratio: self.min_ratio,
                min_area: self.min_area,
            },
        }
    }
}

/// Content search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Aggregation window across providers, in milliseconds
    pub timeout_ms: u64,
    /// Lifetime of cached search items, in seconds
    pub lifetime: u64,
    /// Maximum number of cached items
    pub cache_capacity: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 15000,
            lifetime: 600,
            cache_capacity: 10000,
        }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique identifier)
    pub name: String,
    /// Provider implementation to use
    pub provider: String,
    /// Whether provider is disabled
    pub disabled: bool,
    /// Override of the provider's base URL
    pub base_url: Option<String>,
    /// API key or bearer token if required
    pub api_key: Option<String>,
    /// Maximum number of items returned
    pub max_items: Option<usize>,
    /// Additional provider-specific settings
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: String::new(),
            disabled: false,
            base_url: None,
            api_key: None,
            max_items: None,
            extra: HashMap::new(),
        }
    }
}

/// Default provider configurations
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "youtube".to_string(),
            provider: "youtube".to_string(),
            ..Default::default()
        },
        ProviderConfig {
            name: "eventful".to_string(),
            provider: "eventful".to_string(),
            ..Default::default()
        },
        ProviderConfig {
            name: "spotify".to_string(),
            provider: "spotify".to_string(),
            max_items: Some(16),
            ..Default::default()
        },
    ]
}
