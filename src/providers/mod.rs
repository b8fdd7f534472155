//! Content-discovery providers
//!
//! Each provider turns a query into a list of content items for one media
//! kind. Providers never fail outward; a broken backend yields no items.

mod loader;
mod registry;
mod traits;

pub mod eventful;
pub mod spotify;
pub mod youtube;

pub use loader::ProviderLoader;
pub use registry::ProviderRegistry;
pub use traits::*;
