//! Provider registry, in registration order

use super::traits::{Provider, SearchKind};
use std::sync::Arc;
use tracing::warn;

/// Registered content providers.
///
/// Registration order is significant: merged search results interleave
/// provider lists in this order.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any earlier one with the same name in place
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        match self.providers.iter_mut().find(|p| p.name() == provider.name()) {
            Some(existing) => {
                warn!("Provider {} registered twice, replacing the earlier one", provider.name());
                *existing = provider;
            }
            None => self.providers.push(provider),
        }
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Providers taking part in a search of `kind`, in registration order
    pub fn for_kind(&self, kind: SearchKind) -> Vec<Arc<dyn Provider>> {
        self.providers
            .iter()
            .filter(|p| kind.includes(p.media()))
            .cloned()
            .collect()
    }

    /// Get all provider names
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
