//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod category;
pub mod registration;
pub mod stats;

// Re-export commonly used models
pub use user::{User, Role, CreateUserRequest, UpdateUserRequest, UserFilter};
pub use event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest, EventFilter};
pub use category::{EventCategory, CreateCategoryRequest, UpdateCategoryRequest};
pub use registration::{EventRegistration, RegistrationStatus, AttendanceStatus};
pub use stats::{
    EventStats, RegistrationStats, UserStats, MonthlyEventCount, UserRegistrationCount,
    EventRegistrationCount,
};
