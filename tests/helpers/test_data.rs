//! Test data builders

use chrono::{Duration, Utc};
use sqlx::PgPool;

use evently::config::Settings;
use evently::database::DatabaseService;
use evently::models::event::{CreateEventRequest, Event, EventStatus};
use evently::models::user::{Role, User};
use evently::services::policy::Actor;
use evently::services::ServiceFactory;

/// Settings suitable for tests; no config file or environment involved
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.token_secret = "integration-test-secret-0123456789abcdef".to_string();
    settings.auth.bootstrap_admin_password = "bootstrap-password".to_string();
    settings
}

/// Build the full service stack over a test pool
pub fn build_services(pool: PgPool) -> ServiceFactory {
    ServiceFactory::new(DatabaseService::new(pool), test_settings())
}

/// Build the service stack with a specific upload directory
pub fn build_services_with_uploads(pool: PgPool, upload_dir: &str) -> ServiceFactory {
    let mut settings = test_settings();
    settings.storage.upload_dir = upload_dir.to_string();
    ServiceFactory::new(DatabaseService::new(pool), settings)
}

/// Insert a user directly; the stored hash is real so logins work too
pub async fn create_user(
    services: &ServiceFactory,
    database: &DatabaseService,
    name: &str,
    email: &str,
    role: Role,
) -> User {
    let hash = services
        .auth_service
        .hash_password("password123")
        .expect("hashing failed");

    database
        .users
        .create(name, email, &hash, role, true)
        .await
        .expect("user insert failed")
}

pub fn actor_for(user: &User) -> Actor {
    Actor {
        id: user.id,
        role: user.role,
    }
}

/// A valid event request starting a week out, deadline two days before
pub fn event_request(title: &str, max_participants: Option<i32>, status: EventStatus) -> CreateEventRequest {
    let now = Utc::now();
    CreateEventRequest {
        title: title.to_string(),
        description: format!("{} description", title),
        location: "Main Hall".to_string(),
        start_date: now + Duration::days(7),
        end_date: now + Duration::days(7) + Duration::hours(3),
        registration_deadline: now + Duration::days(5),
        max_participants,
        category_id: None,
        status,
    }
}

/// Create a published event owned by the given admin
pub async fn create_published_event(
    services: &ServiceFactory,
    admin: &Actor,
    title: &str,
    max_participants: Option<i32>,
) -> Event {
    services
        .event_service
        .create_event(admin, event_request(title, max_participants, EventStatus::Published))
        .await
        .expect("event creation failed")
}
