//! Application state shared across handlers

use crate::cache::ItemCache;
use crate::config::Settings;
use crate::images::{Detector, HttpImageFetcher};
use crate::network::HttpClient;
use crate::providers::ProviderRegistry;
use crate::search::Search;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Provider registry
    pub registry: Arc<ProviderRegistry>,
    /// Search executor
    pub search: Arc<Search>,
    /// Page detector
    pub detector: Arc<Detector>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, registry: ProviderRegistry, client: HttpClient) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(registry);

        let cache = ItemCache::new(settings.search.lifetime, settings.search.cache_capacity);
        let search = Arc::new(
            Search::new(registry.clone(), cache).with_timeout(settings.search.timeout()),
        );

        let fetcher = Arc::new(HttpImageFetcher::new(client.clone()));
        let detector = Arc::new(Detector::new(client, fetcher, settings.image.clone()));

        Self {
            settings,
            registry,
            search,
            detector,
        }
    }
}
