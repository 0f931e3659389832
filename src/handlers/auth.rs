//! Login and signup endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::models::user::User;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Session response: the account plus its bearer token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// Authenticate and issue a session token
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (user, token) = state
        .services
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(SessionResponse { user, token }))
}

/// Self-service signup; the account always gets the `user` role
///
/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (user, token) = state
        .services
        .auth_service
        .self_register(&request.name, &request.email, &request.password)
        .await?;

    Ok(Json(SessionResponse { user, token }))
}
