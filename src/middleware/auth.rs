//! Bearer-token actor extraction
//!
//! Recovers the acting user from the `Authorization: Bearer` header.
//! Handlers take `Actor` when authentication is required and
//! `MaybeActor` on routes that also serve anonymous visitors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::services::policy::Actor;

/// An optionally-authenticated actor for public routes
#[derive(Debug, Clone, Copy)]
pub struct MaybeActor(pub Option<Actor>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(ApiError::unauthorized)?;
        let actor = state.services.auth_service.verify_token(token)?;
        Ok(actor)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // An absent or invalid token just means an anonymous request here;
        // the policy decides whether that is enough.
        let actor = bearer_token(parts)
            .and_then(|token| state.services.auth_service.verify_token(token).ok());
        Ok(MaybeActor(actor))
    }
}
