//! Database service layer
//!
//! This module bundles the repositories behind a single handle passed into
//! the service factory.

use crate::database::{
    DatabasePool, UserRepository, EventRepository, CategoryRepository, RegistrationRepository,
    StatsRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub categories: CategoryRepository,
    pub registrations: RegistrationRepository,
    pub stats: StatsRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            stats: StatsRepository::new(pool),
        }
    }
}
