//! Aggregate reporting rows
//!
//! Read-only derived views over the event, registration, and user
//! collections. Recomputed on demand, no caching.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Event counts bucketed by lifecycle status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStats {
    pub total: i64,
    pub upcoming: i64,
    pub draft: i64,
    pub published: i64,
    pub cancelled: i64,
    pub completed: i64,
}

/// Registration counts bucketed by status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

/// User counts bucketed by role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total: i64,
    pub super_admins: i64,
    pub admins: i64,
    pub users: i64,
}

/// One bucket of the trailing-12-month event creation histogram
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyEventCount {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

/// A user ranked by how many registrations they hold
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRegistrationCount {
    pub id: i64,
    pub name: String,
    pub registration_count: i64,
}

/// An event ranked by how many registrations it holds
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistrationCount {
    pub id: i64,
    pub title: String,
    pub registration_count: i64,
}
