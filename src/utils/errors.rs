//! Error handling for Evently
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use std::collections::HashMap;
use thiserror::Error;

/// Why a registration attempt was turned away.
///
/// All three map to the same error kind; the reason is carried only for
/// user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    DeadlinePassed,
    NotPublished,
    Full,
}

impl std::fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosedReason::DeadlinePassed => write!(f, "the registration deadline has passed"),
            ClosedReason::NotPublished => write!(f, "the event is not published"),
            ClosedReason::Full => write!(f, "the event is full"),
        }
    }
}

/// Field-keyed validation failures; always carries every violated
/// constraint, not just the first one found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    /// Return Ok(()) if nothing was recorded, or the accumulated violations
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EventlyError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        parts.sort();
        write!(f, "{}", parts.join("; "))
    }
}

/// Main error type for the Evently application
#[derive(Error, Debug)]
pub enum EventlyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already registered for this event")]
    DuplicateRegistration,

    #[error("Registration closed: {0}")]
    RegistrationClosed(ClosedReason),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Evently operations
pub type Result<T> = std::result::Result<T, EventlyError>;

impl EventlyError {
    /// Whether the error should be surfaced to the requesting user as-is,
    /// rather than masked as an internal failure
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            EventlyError::Validation(_)
                | EventlyError::Unauthorized
                | EventlyError::Forbidden(_)
                | EventlyError::DuplicateRegistration
                | EventlyError::RegistrationClosed(_)
                | EventlyError::Conflict(_)
                | EventlyError::NotFound { .. }
        )
    }
}
