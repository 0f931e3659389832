//! Event service implementation
//!
//! This service owns event lifecycle rules: field validation on create and
//! update, draft visibility, deletion guarded by existing registrations, and
//! the featured image upload.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::database::repositories::{EventRepository, RegistrationRepository};
use crate::models::event::{
    CreateEventRequest, Event, EventFilter, EventStatus, UpdateEventRequest,
};
use crate::services::policy::{authorize, Action, Actor};
use crate::services::storage::StorageService;
use crate::utils::errors::{EventlyError, Result, ValidationErrors};
use crate::utils::helpers::calculate_offset;

/// A page of events with the total match count for pagination
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// An event joined with its live registration figures.
///
/// `is_registered` reflects whether the viewing user already holds a
/// registration; it is absent for anonymous viewers.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    pub event: Event,
    pub registration_count: i64,
    pub available_slots: Option<i64>,
    pub is_registration_open: bool,
    pub is_registered: Option<bool>,
}

/// Event service for lifecycle management and public browsing
#[derive(Clone)]
pub struct EventService {
    event_repository: EventRepository,
    registration_repository: RegistrationRepository,
    storage: StorageService,
    settings: Settings,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(
        event_repository: EventRepository,
        registration_repository: RegistrationRepository,
        storage: StorageService,
        settings: Settings,
    ) -> Self {
        Self {
            event_repository,
            registration_repository,
            storage,
            settings,
        }
    }

    /// Create a new event owned by the acting admin
    pub async fn create_event(&self, actor: &Actor, request: CreateEventRequest) -> Result<Event> {
        authorize(Some(actor), Action::ManageEvents)?;

        let mut errors = ValidationErrors::new();
        validate_fields(&mut errors, &request.title, &request.location, request.start_date, request.end_date, request.registration_deadline, request.max_participants);

        if !matches!(request.status, EventStatus::Draft | EventStatus::Published) {
            errors.add("status", "A new event must be created as draft or published");
        }

        errors.finish()?;

        let event = self.event_repository.create(request, actor.id).await?;
        info!(event_id = event.id, actor_id = actor.id, status = %event.status, "Event created");

        Ok(event)
    }

    /// Update an event; the status field accepts any lifecycle value
    pub async fn update_event(&self, actor: &Actor, id: i64, request: UpdateEventRequest) -> Result<Event> {
        authorize(Some(actor), Action::ManageEvents)?;

        let mut errors = ValidationErrors::new();
        validate_fields(&mut errors, &request.title, &request.location, request.start_date, request.end_date, request.registration_deadline, request.max_participants);
        errors.finish()?;

        let event = self
            .event_repository
            .update(id, request)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Event", id })?;

        info!(event_id = id, actor_id = actor.id, status = %event.status, "Event updated");

        Ok(event)
    }

    /// Delete an event.
    ///
    /// Rejected while any registration exists, whatever its status; an event
    /// with history is never removed from under its registrants.
    pub async fn delete_event(&self, actor: &Actor, id: i64) -> Result<()> {
        authorize(Some(actor), Action::ManageEvents)?;

        let event = self
            .event_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Event", id })?;

        // The check and the tombstone run under the event-row lock shared
        // with the admission engine, so a racing registration either lands
        // before the check or is refused against a tombstoned event.
        let deleted = match self.event_repository.soft_delete_if_unregistered(id).await {
            Err(EventlyError::Conflict(message)) => {
                warn!(event_id = id, "Delete refused: event has registrations");
                return Err(EventlyError::Conflict(message));
            }
            other => other?,
        };

        if !deleted {
            return Err(EventlyError::NotFound { resource: "Event", id });
        }

        if let Some(reference) = event.featured_image {
            self.storage.discard_image(&reference).await?;
        }

        info!(event_id = id, actor_id = actor.id, "Event deleted");

        Ok(())
    }

    /// Get an event with its live registration figures.
    ///
    /// Non-published events are only visible to the admin tier.
    pub async fn get_event(&self, actor: Option<&Actor>, id: i64) -> Result<EventDetails> {
        let event = self
            .event_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Event", id })?;

        if event.status != EventStatus::Published {
            authorize(actor, Action::ManageEvents)
                .map_err(|_| EventlyError::NotFound { resource: "Event", id })?;
        }

        let registration_count = self.registration_repository.count_for_event(id).await?;
        let is_registered = match actor {
            Some(actor) => Some(self.registration_repository.exists(id, actor.id).await?),
            None => None,
        };
        let now = Utc::now();

        Ok(EventDetails {
            available_slots: event.available_slots(registration_count),
            is_registration_open: event.is_registration_open(now, registration_count),
            registration_count,
            is_registered,
            event,
        })
    }

    /// Public listing of published events
    pub async fn list_published(&self, filter: &EventFilter, page: i64) -> Result<EventPage> {
        debug!(page = page, "Listing published events");

        let per_page = self.settings.pagination.events_per_page;
        let offset = calculate_offset(page, per_page);

        let events = self.event_repository.list_published(filter, per_page, offset).await?;
        let total = self.event_repository.count_published(filter).await?;

        Ok(EventPage {
            events,
            total,
            page: page.max(1),
            per_page,
        })
    }

    /// Admin listing of all events, drafts included
    pub async fn list_all(&self, actor: &Actor, page: i64) -> Result<EventPage> {
        authorize(Some(actor), Action::ManageEvents)?;

        let per_page = self.settings.pagination.events_per_page;
        let offset = calculate_offset(page, per_page);

        let events = self.event_repository.list_all(per_page, offset).await?;
        let total = self.event_repository.count_all().await?;

        Ok(EventPage {
            events,
            total,
            page: page.max(1),
            per_page,
        })
    }

    /// Published events that have not started yet
    pub async fn list_upcoming(&self, limit: i64) -> Result<Vec<Event>> {
        self.event_repository.list_upcoming(limit).await
    }

    /// Store a featured image and attach it to the event, discarding any
    /// previously stored reference
    pub async fn upload_featured_image(&self, actor: &Actor, id: i64, original_name: &str, bytes: &[u8]) -> Result<Event> {
        authorize(Some(actor), Action::ManageEvents)?;

        let event = self
            .event_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Event", id })?;

        let reference = self.storage.store_image(original_name, bytes).await?;

        let updated = self
            .event_repository
            .set_featured_image(id, Some(reference.clone()))
            .await?
            .ok_or(EventlyError::NotFound { resource: "Event", id })?;

        if let Some(previous) = event.featured_image {
            self.storage.discard_image(&previous).await?;
        }

        info!(event_id = id, actor_id = actor.id, reference = %reference, "Featured image replaced");

        Ok(updated)
    }
}

/// Field constraints shared by create and update; every violation is
/// recorded, not just the first
fn validate_fields(
    errors: &mut ValidationErrors,
    title: &str,
    location: &str,
    start_date: chrono::DateTime<Utc>,
    end_date: chrono::DateTime<Utc>,
    registration_deadline: chrono::DateTime<Utc>,
    max_participants: Option<i32>,
) {
    if title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    if location.trim().is_empty() {
        errors.add("location", "Location is required");
    }
    if end_date <= start_date {
        errors.add("end_date", "End date must be after the start date");
    }
    if registration_deadline >= start_date {
        errors.add("registration_deadline", "Registration deadline must be before the start date");
    }
    if let Some(max) = max_participants {
        if max < 1 {
            errors.add("max_participants", "Maximum participants must be at least 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn check(request: &CreateEventRequest) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate_fields(
            &mut errors,
            &request.title,
            &request.location,
            request.start_date,
            request.end_date,
            request.registration_deadline,
            request.max_participants,
        );
        errors
    }

    fn valid_request() -> CreateEventRequest {
        let now = Utc::now();
        CreateEventRequest {
            title: "Autumn Fair".to_string(),
            description: "School autumn fair".to_string(),
            location: "Courtyard".to_string(),
            start_date: now + Duration::days(10),
            end_date: now + Duration::days(10) + Duration::hours(4),
            registration_deadline: now + Duration::days(8),
            max_participants: Some(100),
            category_id: None,
            status: EventStatus::Draft,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(check(&valid_request()).is_empty());
    }

    #[test]
    fn test_all_violations_are_enumerated() {
        let now = Utc::now();
        let request = CreateEventRequest {
            title: "  ".to_string(),
            location: String::new(),
            start_date: now + Duration::days(10),
            end_date: now + Duration::days(9),
            registration_deadline: now + Duration::days(11),
            max_participants: Some(0),
            ..valid_request()
        };

        let errors = check(&request);
        assert_eq!(errors.fields().len(), 5);
        assert!(errors.fields().contains_key("title"));
        assert!(errors.fields().contains_key("location"));
        assert!(errors.fields().contains_key("end_date"));
        assert!(errors.fields().contains_key("registration_deadline"));
        assert!(errors.fields().contains_key("max_participants"));
    }

    #[test]
    fn test_deadline_must_precede_start() {
        let mut request = valid_request();
        request.registration_deadline = request.start_date;
        assert!(check(&request).fields().contains_key("registration_deadline"));
    }

    #[test]
    fn test_unlimited_capacity_is_valid() {
        let request = CreateEventRequest {
            max_participants: None,
            ..valid_request()
        };
        assert!(check(&request).is_empty());
    }
}
