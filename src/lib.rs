//! mediapick: time-bounded media aggregation
//!
//! Picks the representative image of a web page from its candidate images,
//! and multiplexes content searches across video, event and audio providers.
//! Both fan work out to slow, unreliable sources and return whatever arrives
//! within a fixed time budget.

pub mod cache;
pub mod config;
pub mod images;
pub mod network;
pub mod providers;
pub mod search;
pub mod web;

pub use config::Settings;
pub use images::{select_best_image, ImageCandidate, ImageSummary, SelectConfig, Selection};
pub use providers::{ContentItem, Provider, SearchContext, SearchKind};
pub use search::{aggregate_search, Search};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
