//! Reporting service implementation
//!
//! Assembles the per-role dashboards from the aggregate queries. Everything
//! here is a derived view recomputed per request.

use serde::Serialize;
use tracing::debug;

use crate::database::repositories::{EventRepository, RegistrationRepository, StatsRepository};
use crate::models::event::Event;
use crate::models::registration::EventRegistration;
use crate::models::stats::{
    EventRegistrationCount, EventStats, MonthlyEventCount, RegistrationStats, UserRegistrationCount,
    UserStats,
};
use crate::services::policy::{authorize, Action, Actor};
use crate::utils::errors::Result;

const DASHBOARD_LIST_LIMIT: i64 = 5;
const TOP_N: i64 = 5;

/// Dashboard for an authenticated user: their own activity plus what is
/// coming up
#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub recent_registrations: Vec<EventRegistration>,
    pub upcoming_events: Vec<Event>,
}

/// Dashboard for the admin tier
#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub event_stats: EventStats,
    pub registration_stats: RegistrationStats,
    pub recent_events: Vec<Event>,
    pub recent_registrations: Vec<EventRegistration>,
}

/// Cross-entity report for the super-admin tier
#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub event_stats: EventStats,
    pub registration_stats: RegistrationStats,
    pub user_stats: UserStats,
    pub monthly_events: Vec<MonthlyEventCount>,
    pub top_users: Vec<UserRegistrationCount>,
    pub top_events: Vec<EventRegistrationCount>,
}

/// Stats service for dashboards and reports
#[derive(Clone)]
pub struct StatsService {
    stats_repository: StatsRepository,
    event_repository: EventRepository,
    registration_repository: RegistrationRepository,
}

impl StatsService {
    /// Create a new StatsService instance
    pub fn new(
        stats_repository: StatsRepository,
        event_repository: EventRepository,
        registration_repository: RegistrationRepository,
    ) -> Self {
        Self {
            stats_repository,
            event_repository,
            registration_repository,
        }
    }

    /// The acting user's dashboard
    pub async fn user_dashboard(&self, actor: &Actor) -> Result<UserDashboard> {
        authorize(Some(actor), Action::ViewOwnDashboard)?;
        debug!(user_id = actor.id, "Building user dashboard");

        let recent_registrations = self
            .registration_repository
            .list_for_user(actor.id, DASHBOARD_LIST_LIMIT)
            .await?;
        let upcoming_events = self.event_repository.list_upcoming(DASHBOARD_LIST_LIMIT).await?;

        Ok(UserDashboard {
            recent_registrations,
            upcoming_events,
        })
    }

    /// The admin dashboard: event and registration figures plus recent
    /// activity
    pub async fn admin_dashboard(&self, actor: &Actor) -> Result<AdminDashboard> {
        authorize(Some(actor), Action::ViewAdminDashboard)?;
        debug!(actor_id = actor.id, "Building admin dashboard");

        let event_stats = self.stats_repository.event_stats().await?;
        let registration_stats = self.stats_repository.registration_stats().await?;
        let recent_events = self.event_repository.list_recent(DASHBOARD_LIST_LIMIT).await?;
        let recent_registrations = self
            .registration_repository
            .list_recent(DASHBOARD_LIST_LIMIT)
            .await?;

        Ok(AdminDashboard {
            event_stats,
            registration_stats,
            recent_events,
            recent_registrations,
        })
    }

    /// The cross-entity system report
    pub async fn system_report(&self, actor: &Actor) -> Result<SystemReport> {
        authorize(Some(actor), Action::ViewSystemReports)?;
        debug!(actor_id = actor.id, "Building system report");

        let event_stats = self.stats_repository.event_stats().await?;
        let registration_stats = self.stats_repository.registration_stats().await?;
        let user_stats = self.stats_repository.user_stats().await?;
        let monthly_events = self.stats_repository.monthly_event_counts().await?;
        let top_users = self.stats_repository.top_users(TOP_N).await?;
        let top_events = self.stats_repository.top_events(TOP_N).await?;

        Ok(SystemReport {
            event_stats,
            registration_stats,
            user_stats,
            monthly_events,
            top_users,
            top_events,
        })
    }
}
