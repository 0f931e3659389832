//! Middleware module
//!
//! Request-level plumbing shared by the handlers

pub mod auth;

pub use auth::MaybeActor;
