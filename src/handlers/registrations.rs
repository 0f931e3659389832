//! Registration endpoints: signup for users, roster management for admins

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::models::registration::{AttendanceStatus, EventRegistration, RegistrationStatus};
use crate::services::policy::Actor;

#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    pub status: RegistrationStatus,
}

#[derive(Debug, Deserialize)]
pub struct AttendancePatch {
    pub attendance: AttendanceStatus,
}

/// Register the acting user for an event
///
/// POST /api/events/:id/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(event_id): Path<i64>,
) -> Result<(StatusCode, Json<EventRegistration>), ApiError> {
    let registration = state
        .services
        .registration_service
        .register(&actor, event_id)
        .await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// The acting user's own registrations
///
/// GET /api/registrations
pub async fn list_own(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<Vec<EventRegistration>>, ApiError> {
    let registrations = state
        .services
        .registration_service
        .list_own(&actor, 50)
        .await?;

    Ok(Json(registrations))
}

/// Roster of registrations for one event
///
/// GET /api/admin/events/:id/registrations
pub async fn list_for_event(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<EventRegistration>>, ApiError> {
    let registrations = state
        .services
        .registration_service
        .list_for_event(&actor, event_id)
        .await?;

    Ok(Json(registrations))
}

/// Set a registration's status
///
/// PATCH /api/admin/registrations/:id/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<EventRegistration>, ApiError> {
    let registration = state
        .services
        .registration_service
        .update_status(&actor, id, patch.status)
        .await?;

    Ok(Json(registration))
}

/// Record attendance on a registration
///
/// PATCH /api/admin/registrations/:id/attendance
pub async fn update_attendance(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(patch): Json<AttendancePatch>,
) -> Result<Json<EventRegistration>, ApiError> {
    let registration = state
        .services
        .registration_service
        .update_attendance(&actor, id, patch.attendance)
        .await?;

    Ok(Json(registration))
}
