//! Event repository implementation
//!
//! All default queries exclude tombstoned rows; deletion is a soft delete
//! that stamps `deleted_at` rather than removing the row.

use sqlx::{PgPool, QueryBuilder, Postgres};
use chrono::Utc;
use crate::models::event::{Event, CreateEventRequest, UpdateEventRequest, EventFilter, EventStatus};
use crate::utils::errors::EventlyError;

const EVENT_COLUMNS: &str = "id, title, description, location, start_date, end_date, \
    registration_deadline, max_participants, status, created_by, category_id, \
    featured_image, deleted_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest, created_by: i64) -> Result<Event, EventlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, location, start_date, end_date,
                registration_deadline, max_participants, status, created_by, category_id,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.registration_deadline)
        .bind(request.max_participants)
        .bind(request.status)
        .bind(created_by)
        .bind(request.category_id)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID, excluding tombstoned events
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event fields and status
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>, EventlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                location = $4,
                start_date = $5,
                end_date = $6,
                registration_deadline = $7,
                max_participants = $8,
                status = $9,
                category_id = $10,
                updated_at = $11
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.registration_deadline)
        .bind(request.max_participants)
        .bind(request.status)
        .bind(request.category_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Replace the stored featured image reference
    pub async fn set_featured_image(&self, id: i64, reference: Option<String>) -> Result<Option<Event>, EventlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET featured_image = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reference)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Tombstone an event unless it has registrations.
    ///
    /// Takes the same event-row lock as the admission engine, so an
    /// admission cannot commit between the registration check and the
    /// tombstone. Returns false when no live event row exists.
    pub async fn soft_delete_if_unregistered(&self, id: i64) -> Result<bool, EventlyError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM events WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Ok(false);
        }

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1"
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if count.0 > 0 {
            return Err(EventlyError::Conflict(
                "Cannot delete an event that has registrations".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE events SET deleted_at = $2, featured_image = NULL, updated_at = $2 WHERE id = $1"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// List published events with the public listing filters
    pub async fn list_published(&self, filter: &EventFilter, limit: i64, offset: i64) -> Result<Vec<Event>, EventlyError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE deleted_at IS NULL AND status = "
        ));
        builder.push_bind(EventStatus::Published);

        Self::apply_filter(&mut builder, filter);

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let events = builder.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    /// Count published events matching the public listing filters
    pub async fn count_published(&self, filter: &EventFilter) -> Result<i64, EventlyError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM events WHERE deleted_at IS NULL AND status = "
        );
        builder.push_bind(EventStatus::Published);

        Self::apply_filter(&mut builder, filter);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    /// List all events for the admin views, drafts included
    pub async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<Event>, EventlyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count all non-tombstoned events
    pub async fn count_all(&self) -> Result<i64, EventlyError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE deleted_at IS NULL"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Get published events that have not started yet
    pub async fn list_upcoming(&self, limit: i64) -> Result<Vec<Event>, EventlyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE deleted_at IS NULL AND status = $1 AND start_date >= NOW()
            ORDER BY start_date ASC LIMIT $2
            "#
        ))
        .bind(EventStatus::Published)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Most recently created events for the admin dashboard
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Event>, EventlyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    fn apply_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
        if let Some(category_id) = filter.category_id {
            builder.push(" AND category_id = ");
            builder.push_bind(category_id);
        }

        if let Some(start_from) = filter.start_from {
            builder.push(" AND start_date >= ");
            builder.push_bind(start_from);
        }

        if let Some(end_until) = filter.end_until {
            builder.push(" AND end_date <= ");
            builder.push_bind(end_until);
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR location ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }
}
