//! Web server module
//!
//! Thin JSON API over page detection and multiplexed search.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
