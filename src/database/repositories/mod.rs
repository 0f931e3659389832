//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod category;
pub mod registration;
pub mod stats;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use category::CategoryRepository;
pub use registration::RegistrationRepository;
pub use stats::StatsRepository;
