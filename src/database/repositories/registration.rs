//! Event registration repository implementation
//!
//! Admission runs inside a single transaction that locks the event row, so
//! the capacity check and the insert always see a consistent snapshot. The
//! compound unique constraint on (event_id, user_id) backstops duplicate
//! admissions that race past the in-transaction existence check.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::event::Event;
use crate::models::registration::{EventRegistration, RegistrationStatus, AttendanceStatus};
use crate::utils::errors::{ClosedReason, EventlyError};

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, attendance, notes, created_at, updated_at";

const DUPLICATE_CONSTRAINT: &str = "event_registrations_event_id_user_id_key";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admit a registration attempt for an event.
    ///
    /// The event row is locked for the duration of the transaction; the
    /// registration count used by the admission predicate therefore reflects
    /// every registration committed before this attempt, and two racing
    /// attempts for the last slot cannot both commit.
    pub async fn admit(&self, event_id: i64, user_id: i64, now: DateTime<Utc>) -> Result<EventRegistration, EventlyError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, location, start_date, end_date,
                registration_deadline, max_participants, status, created_by, category_id,
                featured_image, deleted_at, created_at, updated_at
            FROM events WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EventlyError::NotFound { resource: "Event", id: event_id })?;

        let already_registered: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_registered.0 {
            return Err(EventlyError::DuplicateRegistration);
        }

        // Counts every registration row regardless of status; cancelled
        // registrations keep occupying capacity.
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        if !event.is_registration_open(now, count.0) {
            return Err(EventlyError::RegistrationClosed(closed_reason(&event, now)));
        }

        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            r#"
            INSERT INTO event_registrations (event_id, user_id, status, attendance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(RegistrationStatus::Pending)
        .bind(AttendanceStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_duplicate)?;

        tx.commit().await?;

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<EventRegistration>, EventlyError> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Set registration status; any value is accepted unconditionally
    pub async fn update_status(&self, id: i64, status: RegistrationStatus) -> Result<Option<EventRegistration>, EventlyError> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            r#"
            UPDATE event_registrations
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Set attendance; any value is accepted unconditionally
    pub async fn update_attendance(&self, id: i64, attendance: AttendanceStatus) -> Result<Option<EventRegistration>, EventlyError> {
        let registration = sqlx::query_as::<_, EventRegistration>(&format!(
            r#"
            UPDATE event_registrations
            SET attendance = $2, updated_at = $3
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(attendance)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Get registrations for an event
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<EventRegistration>, EventlyError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE event_id = $1 ORDER BY created_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Get a user's registrations, most recent first
    pub async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<EventRegistration>, EventlyError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Most recent registrations across all events for the admin dashboard
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<EventRegistration>, EventlyError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Count registrations for an event, all statuses included
    pub async fn count_for_event(&self, event_id: i64) -> Result<i64, EventlyError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Check if a user is registered for an event
    pub async fn exists(&self, event_id: i64, user_id: i64) -> Result<bool, EventlyError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }
}

/// Determine the closed sub-reason for user messaging
fn closed_reason(event: &Event, now: DateTime<Utc>) -> ClosedReason {
    use crate::models::event::EventStatus;

    if now >= event.registration_deadline {
        ClosedReason::DeadlinePassed
    } else if event.status != EventStatus::Published {
        ClosedReason::NotPublished
    } else {
        ClosedReason::Full
    }
}

/// Map a compound-key violation to the duplicate-registration error
fn map_duplicate(err: sqlx::Error) -> EventlyError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(DUPLICATE_CONSTRAINT) => {
            EventlyError::DuplicateRegistration
        }
        _ => err.into(),
    }
}
