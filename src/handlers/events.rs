//! Event endpoints: public browsing plus admin lifecycle management

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::MaybeActor;
use crate::models::event::{CreateEventRequest, Event, EventFilter, UpdateEventRequest};
use crate::services::event::{EventDetails, EventPage};
use crate::services::policy::Actor;

/// Query parameters for the public listing
#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub page: Option<i64>,
    pub category_id: Option<i64>,
    pub start_from: Option<chrono::DateTime<chrono::Utc>>,
    pub end_until: Option<chrono::DateTime<chrono::Utc>>,
    pub search: Option<String>,
}

impl EventListQuery {
    fn filter(&self) -> EventFilter {
        EventFilter {
            category_id: self.category_id,
            start_from: self.start_from,
            end_until: self.end_until,
            search: self.search.clone(),
        }
    }
}

/// List published events with filters and pagination
///
/// GET /api/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<EventPage>, ApiError> {
    let page = state
        .services
        .event_service
        .list_published(&query.filter(), query.page.unwrap_or(1))
        .await?;

    Ok(Json(page))
}

/// Get one event with its live registration figures; drafts are only
/// visible to admins
///
/// GET /api/events/:id
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    MaybeActor(actor): MaybeActor,
    Path(id): Path<i64>,
) -> Result<Json<EventDetails>, ApiError> {
    let details = state
        .services
        .event_service
        .get_event(actor.as_ref(), id)
        .await?;

    Ok(Json(details))
}

/// List all events, drafts included
///
/// GET /api/admin/events
pub async fn list_all_events(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<EventListQuery>,
) -> Result<Json<EventPage>, ApiError> {
    let page = state
        .services
        .event_service
        .list_all(&actor, query.page.unwrap_or(1))
        .await?;

    Ok(Json(page))
}

/// Create an event
///
/// POST /api/admin/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state
        .services
        .event_service
        .create_event(&actor, request)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event
///
/// PUT /api/admin/events/:id
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .services
        .event_service
        .update_event(&actor, id, request)
        .await?;

    Ok(Json(event))
}

/// Delete an event; refused while registrations exist
///
/// DELETE /api/admin/events/:id
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.event_service.delete_event(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a featured image, replacing any previous one
///
/// POST /api/admin/events/:id/image
pub async fn upload_featured_image(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Event>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| ApiError::bad_request("Image field is missing a filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?;

        let event = state
            .services
            .event_service
            .upload_featured_image(&actor, id, &original_name, &bytes)
            .await?;

        return Ok(Json(event));
    }

    Err(ApiError::bad_request("Missing \"image\" field"))
}
