//! Aggregate statistics queries
//!
//! Read-only group-by queries backing the dashboards. These reflect current
//! entity state; nothing is cached or maintained incrementally.

use sqlx::PgPool;
use crate::models::event::EventStatus;
use crate::models::registration::RegistrationStatus;
use crate::models::stats::{
    EventStats, RegistrationStats, UserStats, MonthlyEventCount, UserRegistrationCount,
    EventRegistrationCount,
};
use crate::models::user::Role;
use crate::utils::errors::EventlyError;

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Event counts by lifecycle status, tombstoned events excluded
    pub async fn event_stats(&self) -> Result<EventStats, EventlyError> {
        let rows: Vec<(EventStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM events WHERE deleted_at IS NULL GROUP BY status"
        )
        .fetch_all(&self.pool)
        .await?;

        let upcoming: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE deleted_at IS NULL AND status = $1 AND start_date >= NOW()"
        )
        .bind(EventStatus::Published)
        .fetch_one(&self.pool)
        .await?;

        let mut stats = EventStats {
            upcoming: upcoming.0,
            ..EventStats::default()
        };
        for (status, count) in rows {
            stats.total += count;
            match status {
                EventStatus::Draft => stats.draft = count,
                EventStatus::Published => stats.published = count,
                EventStatus::Cancelled => stats.cancelled = count,
                EventStatus::Completed => stats.completed = count,
            }
        }

        Ok(stats)
    }

    /// Registration counts by status
    pub async fn registration_stats(&self) -> Result<RegistrationStats, EventlyError> {
        let rows: Vec<(RegistrationStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM event_registrations GROUP BY status"
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = RegistrationStats::default();
        for (status, count) in rows {
            stats.total += count;
            match status {
                RegistrationStatus::Pending => stats.pending = count,
                RegistrationStatus::Confirmed => stats.confirmed = count,
                RegistrationStatus::Cancelled => stats.cancelled = count,
            }
        }

        Ok(stats)
    }

    /// User counts by role
    pub async fn user_stats(&self) -> Result<UserStats, EventlyError> {
        let rows: Vec<(Role, i64)> = sqlx::query_as(
            "SELECT role, COUNT(*) FROM users GROUP BY role"
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = UserStats::default();
        for (role, count) in rows {
            stats.total += count;
            match role {
                Role::SuperAdmin => stats.super_admins = count,
                Role::Admin => stats.admins = count,
                Role::User => stats.users = count,
            }
        }

        Ok(stats)
    }

    /// Event-creation histogram for the trailing 12 months, grouped by
    /// (year, month) in ascending order
    pub async fn monthly_event_counts(&self) -> Result<Vec<MonthlyEventCount>, EventlyError> {
        let counts = sqlx::query_as::<_, MonthlyEventCount>(
            r#"
            SELECT EXTRACT(YEAR FROM created_at)::INT AS year,
                   EXTRACT(MONTH FROM created_at)::INT AS month,
                   COUNT(*) AS count
            FROM events
            WHERE created_at >= NOW() - INTERVAL '12 months'
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Most active users by registration count, ties broken by ascending id
    pub async fn top_users(&self, limit: i64) -> Result<Vec<UserRegistrationCount>, EventlyError> {
        let users = sqlx::query_as::<_, UserRegistrationCount>(
            r#"
            SELECT u.id, u.name, COUNT(r.id) AS registration_count
            FROM users u
            LEFT JOIN event_registrations r ON u.id = r.user_id
            GROUP BY u.id, u.name
            ORDER BY registration_count DESC, u.id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Most popular events by registration count, ties broken by ascending id
    pub async fn top_events(&self, limit: i64) -> Result<Vec<EventRegistrationCount>, EventlyError> {
        let events = sqlx::query_as::<_, EventRegistrationCount>(
            r#"
            SELECT e.id, e.title, COUNT(r.id) AS registration_count
            FROM events e
            LEFT JOIN event_registrations r ON e.id = r.event_id
            WHERE e.deleted_at IS NULL
            GROUP BY e.id, e.title
            ORDER BY registration_count DESC, e.id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
