//! Admission engine integration tests
//!
//! Covers the registration rules end to end against a real PostgreSQL
//! instance: duplicates, capacity, deadlines, draft events, and the race
//! for the last slot.

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serial_test::serial;

use evently::database::DatabaseService;
use evently::models::event::EventStatus;
use evently::models::registration::{AttendanceStatus, RegistrationStatus};
use evently::models::user::Role;
use evently::utils::errors::{ClosedReason, EventlyError};

use helpers::test_data::{
    actor_for, build_services, create_published_event, create_user, event_request,
};
use helpers::TestDatabase;

#[tokio::test]
#[serial]
async fn test_registration_is_admitted_as_pending() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let event = create_published_event(&services, &actor_for(&admin), "Gala", Some(10)).await;

    let registration = services
        .registration_service
        .register(&actor_for(&user), event.id)
        .await
        .unwrap();

    assert_eq!(registration.event_id, event.id);
    assert_eq!(registration.user_id, user.id);
    assert_eq!(registration.status, RegistrationStatus::Pending);
    assert_eq!(registration.attendance, AttendanceStatus::Pending);
}

#[tokio::test]
#[serial]
async fn test_duplicate_registration_is_rejected() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let event = create_published_event(&services, &actor_for(&admin), "Gala", None).await;

    let actor = actor_for(&user);
    services.registration_service.register(&actor, event.id).await.unwrap();

    let second = services.registration_service.register(&actor, event.id).await;
    assert_matches!(second, Err(EventlyError::DuplicateRegistration));
}

#[tokio::test]
#[serial]
async fn test_full_event_rejects_with_full_reason() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let event = create_published_event(&services, &actor_for(&admin), "Workshop", Some(1)).await;

    let first = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let second = create_user(&services, &database, "Bob", "bob@school.com", Role::User).await;

    services
        .registration_service
        .register(&actor_for(&first), event.id)
        .await
        .unwrap();

    let result = services
        .registration_service
        .register(&actor_for(&second), event.id)
        .await;

    assert_matches!(
        result,
        Err(EventlyError::RegistrationClosed(ClosedReason::Full))
    );
}

#[tokio::test]
#[serial]
async fn test_cancelled_registration_still_occupies_capacity() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let event = create_published_event(&services, &actor_for(&admin), "Workshop", Some(1)).await;

    let first = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let second = create_user(&services, &database, "Bob", "bob@school.com", Role::User).await;

    let registration = services
        .registration_service
        .register(&actor_for(&first), event.id)
        .await
        .unwrap();

    services
        .registration_service
        .update_status(&actor_for(&admin), registration.id, RegistrationStatus::Cancelled)
        .await
        .unwrap();

    // The cancelled row keeps counting against the cap
    let result = services
        .registration_service
        .register(&actor_for(&second), event.id)
        .await;

    assert_matches!(
        result,
        Err(EventlyError::RegistrationClosed(ClosedReason::Full))
    );
}

#[tokio::test]
#[serial]
async fn test_draft_event_is_closed_for_registration() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let event = services
        .event_service
        .create_event(&actor_for(&admin), event_request("Draft Event", None, EventStatus::Draft))
        .await
        .unwrap();

    let result = services
        .registration_service
        .register(&actor_for(&user), event.id)
        .await;

    assert_matches!(
        result,
        Err(EventlyError::RegistrationClosed(ClosedReason::NotPublished))
    );
}

#[tokio::test]
#[serial]
async fn test_passed_deadline_closes_registration() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let event = create_published_event(&services, &actor_for(&admin), "Gala", None).await;

    // Drive the admission clock past the deadline through the repository
    let after_deadline = event.registration_deadline + Duration::minutes(1);
    let result = database.registrations.admit(event.id, user.id, after_deadline).await;

    assert_matches!(
        result,
        Err(EventlyError::RegistrationClosed(ClosedReason::DeadlinePassed))
    );
}

#[tokio::test]
#[serial]
async fn test_registering_for_missing_event_is_not_found() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let result = services
        .registration_service
        .register(&actor_for(&user), 999_999)
        .await;

    assert_matches!(result, Err(EventlyError::NotFound { resource: "Event", .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_race_for_last_slot_admits_exactly_one() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let event = create_published_event(&services, &actor_for(&admin), "Hot Ticket", Some(1)).await;

    let mut users = Vec::new();
    for i in 0..5 {
        let user = create_user(
            &services,
            &database,
            &format!("User {}", i),
            &format!("user{}@school.com", i),
            Role::User,
        )
        .await;
        users.push(user);
    }

    let now = Utc::now();
    let mut handles = Vec::new();
    for user in &users {
        let repo = database.registrations.clone();
        let event_id = event.id;
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            repo.admit(event_id, user_id, now).await
        }));
    }

    let mut admitted = 0;
    let mut closed = 0;
    for outcome in futures::future::join_all(handles).await {
        match outcome.unwrap() {
            Ok(_) => admitted += 1,
            Err(EventlyError::RegistrationClosed(ClosedReason::Full)) => closed += 1,
            Err(other) => panic!("unexpected admission error: {:?}", other),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(closed, 4);

    let count = database.registrations.count_for_event(event.id).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[serial]
async fn test_attendance_and_status_are_independent() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let user = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let event = create_published_event(&services, &actor_for(&admin), "Gala", None).await;

    let registration = services
        .registration_service
        .register(&actor_for(&user), event.id)
        .await
        .unwrap();

    let admin_actor = actor_for(&admin);
    services
        .registration_service
        .update_status(&admin_actor, registration.id, RegistrationStatus::Cancelled)
        .await
        .unwrap();

    // Attendance can still be recorded on a cancelled registration
    let updated = services
        .registration_service
        .update_attendance(&admin_actor, registration.id, AttendanceStatus::Present)
        .await
        .unwrap();

    assert_eq!(updated.status, RegistrationStatus::Cancelled);
    assert_eq!(updated.attendance, AttendanceStatus::Present);
}
