//! Search orchestration module
//!
//! Fans a query out to content providers within a time budget and merges
//! the lists that arrive.

mod executor;

pub use executor::{aggregate_search, interleave, Search};
