//! Evently
//!
//! An event management backend: admins publish events with capacity limits
//! and registration windows, users register for them, and the admission
//! engine guarantees a capped event never overfills. This library provides
//! the models, persistence layer, business services, and HTTP handlers.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventlyError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::AppState;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
