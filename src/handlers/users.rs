//! User administration and self-service profile endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::models::user::{CreateUserRequest, Role, UpdateUserRequest, User, UserFilter};
use crate::services::policy::Actor;
use crate::services::user::{BulkAction, UserPage};

/// Query parameters for the user listing and CSV export
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl UserListQuery {
    fn filter(&self) -> UserFilter {
        UserFilter {
            role: self.role,
            is_active: self.is_active,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: BulkActionName,
    pub ids: Vec<i64>,
}

/// Wire names for the bulk actions
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionName {
    Activate,
    Deactivate,
    Delete,
}

impl From<BulkActionName> for BulkAction {
    fn from(name: BulkActionName) -> Self {
        match name {
            BulkActionName::Activate => BulkAction::Activate,
            BulkActionName::Deactivate => BulkAction::Deactivate,
            BulkActionName::Delete => BulkAction::Delete,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: u64,
}

/// The plaintext reset credential, returned exactly once
#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub password: String,
}

/// List users with filters and pagination
///
/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let page = state
        .services
        .user_service
        .list_users(&actor, &query.filter(), query.page.unwrap_or(1))
        .await?;

    Ok(Json(page))
}

/// Get one account
///
/// GET /api/admin/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.services.user_service.get_user(&actor, id).await?;
    Ok(Json(user))
}

/// Create an account with an explicit role
///
/// POST /api/admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .services
        .user_service
        .create_user(&actor, request)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update an account
///
/// PUT /api/admin/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .user_service
        .update_user(&actor, id, request)
        .await?;

    Ok(Json(user))
}

/// Delete an account and its registrations
///
/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.user_service.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip an account between active and inactive
///
/// POST /api/admin/users/:id/toggle-status
pub async fn toggle_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.services.user_service.toggle_status(&actor, id).await?;
    Ok(Json(user))
}

/// Replace an account's credential with a random one
///
/// POST /api/admin/users/:id/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    let password = state.services.user_service.reset_password(&actor, id).await?;
    Ok(Json(ResetPasswordResponse { password }))
}

/// Apply one action to a batch of accounts
///
/// POST /api/admin/users/bulk
pub async fn bulk_action(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    let affected = state
        .services
        .user_service
        .bulk_action(&actor, request.action.into(), &request.ids)
        .await?;

    Ok(Json(BulkResponse { affected }))
}

/// Export users matching the filters as a CSV download
///
/// GET /api/admin/users/export
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = state
        .services
        .user_service
        .export_csv(&actor, &query.filter())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users.csv\"",
            ),
        ],
        csv,
    ))
}

/// The acting user's own account
///
/// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<User>, ApiError> {
    let user = state.services.user_service.get_own_profile(&actor).await?;
    Ok(Json(user))
}

/// Self-service profile update; role and status changes are ignored
///
/// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .user_service
        .update_own_profile(&actor, request)
        .await?;

    Ok(Json(user))
}
