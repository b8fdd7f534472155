//! HTTP networking module
//!
//! Provides the HTTP client shared by page scraping, image fetchers and
//! content providers.

mod client;
mod user_agent;

pub use client::{HttpClient, Request, Response};
pub use user_agent::generate_user_agent;
