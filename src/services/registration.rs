//! Registration service implementation
//!
//! Thin policy-enforcing wrapper over the admission engine: signup for
//! authenticated users, status and attendance management for admins.

use chrono::Utc;
use tracing::{debug, info};

use crate::database::repositories::RegistrationRepository;
use crate::models::registration::{AttendanceStatus, EventRegistration, RegistrationStatus};
use crate::services::policy::{authorize, Action, Actor};
use crate::utils::errors::{EventlyError, Result};

/// Registration service wrapping the admission engine
#[derive(Clone)]
pub struct RegistrationService {
    registration_repository: RegistrationRepository,
}

impl RegistrationService {
    /// Create a new RegistrationService instance
    pub fn new(registration_repository: RegistrationRepository) -> Self {
        Self {
            registration_repository,
        }
    }

    /// Register the acting user for an event.
    ///
    /// All admission rules (duplicate, deadline, published, capacity) are
    /// enforced inside one transaction by the repository.
    pub async fn register(&self, actor: &Actor, event_id: i64) -> Result<EventRegistration> {
        authorize(Some(actor), Action::RegisterForEvent)?;

        let registration = self
            .registration_repository
            .admit(event_id, actor.id, Utc::now())
            .await?;

        info!(
            registration_id = registration.id,
            event_id,
            user_id = actor.id,
            "Registration admitted"
        );

        Ok(registration)
    }

    /// Set a registration's status; accepts any value unconditionally
    pub async fn update_status(&self, actor: &Actor, id: i64, status: RegistrationStatus) -> Result<EventRegistration> {
        authorize(Some(actor), Action::ManageRegistrations)?;

        let registration = self
            .registration_repository
            .update_status(id, status)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Registration", id })?;

        info!(registration_id = id, actor_id = actor.id, status = status.as_str(), "Registration status set");

        Ok(registration)
    }

    /// Record attendance; accepts any value unconditionally
    pub async fn update_attendance(&self, actor: &Actor, id: i64, attendance: AttendanceStatus) -> Result<EventRegistration> {
        authorize(Some(actor), Action::ManageRegistrations)?;

        let registration = self
            .registration_repository
            .update_attendance(id, attendance)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Registration", id })?;

        info!(registration_id = id, actor_id = actor.id, attendance = attendance.as_str(), "Attendance recorded");

        Ok(registration)
    }

    /// All registrations for an event, for the admin roster
    pub async fn list_for_event(&self, actor: &Actor, event_id: i64) -> Result<Vec<EventRegistration>> {
        authorize(Some(actor), Action::ManageRegistrations)?;
        self.registration_repository.list_for_event(event_id).await
    }

    /// The acting user's own registrations, most recent first
    pub async fn list_own(&self, actor: &Actor, limit: i64) -> Result<Vec<EventRegistration>> {
        authorize(Some(actor), Action::ViewOwnRegistrations)?;
        debug!(user_id = actor.id, "Listing own registrations");
        self.registration_repository.list_for_user(actor.id, limit).await
    }
}
