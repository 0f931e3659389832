//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod category;
pub mod event;
pub mod policy;
pub mod registration;
pub mod stats;
pub mod storage;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, Claims};
pub use category::CategoryService;
pub use event::{EventDetails, EventPage, EventService};
pub use policy::{authorize, can_perform, Action, Actor, Tier};
pub use registration::RegistrationService;
pub use stats::{AdminDashboard, StatsService, SystemReport, UserDashboard};
pub use storage::StorageService;
pub use user::{BulkAction, UserPage, UserService};

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub category_service: CategoryService,
    pub stats_service: StatsService,
    pub storage_service: StorageService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(database: DatabaseService, settings: Settings) -> Self {
        let storage_service = StorageService::new(&settings);
        let auth_service = AuthService::new(database.users.clone(), settings.clone());
        let user_service = UserService::new(
            database.users.clone(),
            auth_service.clone(),
            settings.clone(),
        );
        let event_service = EventService::new(
            database.events.clone(),
            database.registrations.clone(),
            storage_service.clone(),
            settings,
        );
        let registration_service = RegistrationService::new(database.registrations.clone());
        let category_service = CategoryService::new(database.categories.clone());
        let stats_service = StatsService::new(
            database.stats,
            database.events,
            database.registrations,
        );

        Self {
            auth_service,
            user_service,
            event_service,
            registration_service,
            category_service,
            stats_service,
            storage_service,
        }
    }
}
