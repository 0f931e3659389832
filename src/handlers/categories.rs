//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::models::category::{CreateCategoryRequest, EventCategory, UpdateCategoryRequest};
use crate::services::policy::Actor;

/// Active categories for public browsing
///
/// GET /api/categories
pub async fn list_active(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventCategory>>, ApiError> {
    let categories = state.services.category_service.list_active().await?;
    Ok(Json(categories))
}

/// Every category, inactive ones included
///
/// GET /api/admin/categories
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<Vec<EventCategory>>, ApiError> {
    let categories = state.services.category_service.list_all(&actor).await?;
    Ok(Json(categories))
}

/// Create a category
///
/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<EventCategory>), ApiError> {
    let category = state
        .services
        .category_service
        .create_category(&actor, request)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
///
/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<EventCategory>, ApiError> {
    let category = state
        .services
        .category_service
        .update_category(&actor, id, request)
        .await?;

    Ok(Json(category))
}

/// Delete a category
///
/// DELETE /api/admin/categories/:id
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .category_service
        .delete_category(&actor, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
