//! Provider loader for initializing providers from configuration

use super::eventful::EventfulProvider;
use super::registry::ProviderRegistry;
use super::spotify::SpotifyProvider;
use super::traits::Provider;
use super::youtube::YouTubeProvider;
use crate::config::{ProviderConfig, Settings};
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Load all enabled providers from settings, in declaration order
    pub fn load(settings: &Settings, client: &HttpClient) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();

        let enabled = settings.enabled_providers();
        let disabled = settings.providers.len() - enabled.len();
        if disabled > 0 {
            info!("Skipping {} disabled providers", disabled);
        }

        for config in enabled {
            match Self::create_provider(config, client.clone()) {
                Ok(provider) => {
                    info!("Loaded provider: {} ({})", config.name, config.provider);
                    registry.register(provider);
                }
                Err(e) => {
                    warn!("Failed to load provider {}: {}", config.name, e);
                }
            }
        }

        info!("Loaded {} providers", registry.len());
        registry
    }

    /// Create a provider instance from its config
    fn create_provider(config: &ProviderConfig, client: HttpClient) -> Result<Arc<dyn Provider>> {
        let provider: Arc<dyn Provider> = match config.provider.as_str() {
            "youtube" => {
                let mut provider = YouTubeProvider::new(client).with_name(&config.name);
                if let Some(ref url) = config.base_url {
                    provider = provider.with_base_url(url);
                }
                if let Some(max) = config.max_items {
                    provider = provider.with_max_items(max);
                }
                Arc::new(provider)
            }
            "eventful" => {
                let mut provider =
                    EventfulProvider::new(client, Self::require_key(config)?).with_name(&config.name);
                if let Some(ref url) = config.base_url {
                    provider = provider.with_base_url(url);
                }
                Arc::new(provider)
            }
            "spotify" => {
                let mut provider =
                    SpotifyProvider::new(client, Self::require_key(config)?).with_name(&config.name);
                if let Some(ref url) = config.base_url {
                    provider = provider.with_base_url(url);
                }
                if let Some(max) = config.max_items {
                    provider = provider.with_max_items(max);
                }
                Arc::new(provider)
            }
            other => {
                return Err(anyhow::anyhow!("Unknown provider type: {}", other));
            }
        };

        Ok(provider)
    }

    fn require_key(config: &ProviderConfig) -> Result<&str> {
        config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow::anyhow!("provider {} requires api_key", config.name))
    }

    /// Get list of available provider types
    pub fn available_providers() -> Vec<&'static str> {
        vec!["youtube", "eventful", "spotify"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_skip_keyless_providers() {
        let settings = Settings::default();
        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap());

        assert_eq!(registry.names(), vec!["youtube"]);
    }

    #[test]
    fn test_load_with_keys_in_order() {
        let mut settings = Settings::default();
        for provider in settings.providers.iter_mut() {
            provider.api_key = Some("key".to_string());
        }
        settings.providers.push(ProviderConfig {
            name: "mystery".to_string(),
            provider: "mystery".to_string(),
            ..Default::default()
        });

        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap());
        assert_eq!(registry.names(), vec!["youtube", "eventful", "spotify"]);
        assert_eq!(ProviderLoader::available_providers().len(), 3);
    }

    #[test]
    fn test_providers_registered_under_config_names() {
        let settings = Settings {
            providers: vec![
                ProviderConfig {
                    name: "music-videos".to_string(),
                    provider: "youtube".to_string(),
                    ..Default::default()
                },
                ProviderConfig {
                    name: "lectures".to_string(),
                    provider: "youtube".to_string(),
                    max_items: Some(5),
                    ..Default::default()
                },
                ProviderConfig {
                    name: "off".to_string(),
                    provider: "youtube".to_string(),
                    disabled: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap());
        assert_eq!(registry.names(), vec!["music-videos", "lectures"]);
        assert!(registry.get("youtube").is_none());
    }
}
