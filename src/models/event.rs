//! Event model
//!
//! The event owns its lifecycle status and the capacity/scheduling
//! invariants. "Upcoming" and "registration open" are derived predicates
//! computed from the current clock and registration count, never stored.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Event lifecycle status, externally triggered (no automatic expiry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub status: EventStatus,
    pub created_by: i64,
    pub category_id: Option<i64>,
    pub featured_image: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether a registration attempt can be admitted right now.
    ///
    /// The count covers every registration row for the event regardless of
    /// its status; cancelled registrations keep occupying capacity.
    pub fn is_registration_open(&self, now: DateTime<Utc>, registration_count: i64) -> bool {
        now < self.registration_deadline
            && self.status == EventStatus::Published
            && self
                .max_participants
                .map_or(true, |max| registration_count < max as i64)
    }

    /// Remaining capacity; `None` means unlimited, never negative otherwise
    pub fn available_slots(&self, registration_count: i64) -> Option<i64> {
        self.max_participants
            .map(|max| (max as i64 - registration_count).max(0))
    }

    /// Published and not yet started
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date >= now && self.status == EventStatus::Published
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub category_id: Option<i64>,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub category_id: Option<i64>,
    pub status: EventStatus,
}

/// Filters for the public event listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub category_id: Option<i64>,
    pub start_from: Option<DateTime<Utc>>,
    pub end_until: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event(max_participants: Option<i32>, status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: 1,
            title: "Spring Gala".to_string(),
            description: "Annual spring gala".to_string(),
            location: "Main Hall".to_string(),
            start_date: now + Duration::days(7),
            end_date: now + Duration::days(7) + Duration::hours(3),
            registration_deadline: now + Duration::days(5),
            max_participants,
            status,
            created_by: 1,
            category_id: None,
            featured_image: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_registration_open_for_published_event_with_room() {
        let event = sample_event(Some(10), EventStatus::Published);
        assert!(event.is_registration_open(Utc::now(), 3));
    }

    #[test]
    fn test_registration_closed_after_deadline() {
        let event = sample_event(None, EventStatus::Published);
        let after_deadline = event.registration_deadline + Duration::minutes(1);
        assert!(!event.is_registration_open(after_deadline, 0));
    }

    #[test]
    fn test_registration_closed_for_draft_event() {
        let event = sample_event(None, EventStatus::Draft);
        assert!(!event.is_registration_open(Utc::now(), 0));
    }

    #[test]
    fn test_registration_closed_when_full() {
        let event = sample_event(Some(5), EventStatus::Published);
        assert!(event.is_registration_open(Utc::now(), 4));
        assert!(!event.is_registration_open(Utc::now(), 5));
        assert!(!event.is_registration_open(Utc::now(), 6));
    }

    #[test]
    fn test_available_slots_unlimited() {
        let event = sample_event(None, EventStatus::Published);
        assert_eq!(event.available_slots(1000), None);
    }

    #[test]
    fn test_available_slots_never_negative() {
        let event = sample_event(Some(5), EventStatus::Published);
        assert_eq!(event.available_slots(3), Some(2));
        assert_eq!(event.available_slots(6), Some(0));
    }

    #[test]
    fn test_is_upcoming() {
        let event = sample_event(None, EventStatus::Published);
        assert!(event.is_upcoming(Utc::now()));
        assert!(!event.is_upcoming(event.start_date + Duration::minutes(1)));

        let draft = sample_event(None, EventStatus::Draft);
        assert!(!draft.is_upcoming(Utc::now()));
    }
}
