//! User administration integration tests
//!
//! Self-protection rules, bulk actions, cascade deletion, role policy, and
//! the CSV export.

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;

use evently::database::DatabaseService;
use evently::models::user::{CreateUserRequest, Role, UpdateUserRequest, UserFilter};
use evently::services::user::BulkAction;
use evently::utils::errors::EventlyError;

use helpers::test_data::{actor_for, build_services, create_user};
use helpers::TestDatabase;

#[tokio::test]
#[serial]
async fn test_super_admin_creates_accounts_with_roles() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;

    let user = services
        .user_service
        .create_user(
            &actor_for(&root),
            CreateUserRequest {
                name: "New Admin".to_string(),
                email: "new.admin@school.com".to_string(),
                password: "password123".to_string(),
                role: Role::Admin,
                is_active: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(user.is_active);
}

#[tokio::test]
#[serial]
async fn test_admin_cannot_manage_users() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;

    let result = services
        .user_service
        .list_users(&actor_for(&admin), &UserFilter::default(), 1)
        .await;

    assert_matches!(result, Err(EventlyError::Forbidden(_)));
}

#[tokio::test]
#[serial]
async fn test_duplicate_email_is_a_field_violation() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let result = services
        .user_service
        .create_user(
            &actor_for(&root),
            CreateUserRequest {
                name: "Duplicate".to_string(),
                email: "alice@school.com".to_string(),
                password: "password123".to_string(),
                role: Role::User,
                is_active: true,
            },
        )
        .await;

    match result {
        Err(EventlyError::Validation(errors)) => {
            assert!(errors.fields().contains_key("email"));
        }
        other => panic!("expected validation error, got {:?}", other.err()),
    }
}

#[tokio::test]
#[serial]
async fn test_acting_account_cannot_delete_itself() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let actor = actor_for(&root);

    assert_matches!(
        services.user_service.delete_user(&actor, root.id).await,
        Err(EventlyError::Conflict(_))
    );
    assert_matches!(
        services.user_service.toggle_status(&actor, root.id).await,
        Err(EventlyError::Conflict(_))
    );

    let update = UpdateUserRequest {
        is_active: Some(false),
        ..UpdateUserRequest::default()
    };
    assert_matches!(
        services.user_service.update_user(&actor, root.id, update).await,
        Err(EventlyError::Conflict(_))
    );
}

#[tokio::test]
#[serial]
async fn test_bulk_action_containing_actor_rejects_whole_batch() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let bob = create_user(&services, &database, "Bob", "bob@school.com", Role::User).await;

    let result = services
        .user_service
        .bulk_action(&actor_for(&root), BulkAction::Deactivate, &[alice.id, root.id, bob.id])
        .await;

    assert_matches!(result, Err(EventlyError::Conflict(_)));

    // Nothing in the batch was touched
    let alice_after = database.users.find_by_id(alice.id).await.unwrap().unwrap();
    let bob_after = database.users.find_by_id(bob.id).await.unwrap().unwrap();
    assert!(alice_after.is_active);
    assert!(bob_after.is_active);
}

#[tokio::test]
#[serial]
async fn test_bulk_deactivate_and_delete() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    let bob = create_user(&services, &database, "Bob", "bob@school.com", Role::User).await;
    let actor = actor_for(&root);

    let affected = services
        .user_service
        .bulk_action(&actor, BulkAction::Deactivate, &[alice.id, bob.id])
        .await
        .unwrap();
    assert_eq!(affected, 2);

    let affected = services
        .user_service
        .bulk_action(&actor, BulkAction::Delete, &[alice.id])
        .await
        .unwrap();
    assert_eq!(affected, 1);

    assert!(database.users.find_by_id(alice.id).await.unwrap().is_none());
    assert!(database.users.find_by_id(bob.id).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn test_deleting_a_user_removes_their_registrations() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let admin = create_user(&services, &database, "Admin", "admin@school.com", Role::Admin).await;
    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let event = helpers::test_data::create_published_event(
        &services,
        &actor_for(&admin),
        "Gala",
        None,
    )
    .await;

    services
        .registration_service
        .register(&actor_for(&alice), event.id)
        .await
        .unwrap();

    services
        .user_service
        .delete_user(&actor_for(&root), alice.id)
        .await
        .unwrap();

    let count = database.registrations.count_for_event(event.id).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[serial]
async fn test_reset_password_issues_usable_credential() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let password = services
        .user_service
        .reset_password(&actor_for(&root), alice.id)
        .await
        .unwrap();

    assert_eq!(password.len(), 10);

    // The old credential is gone and the new one logs in
    assert_matches!(
        services.auth_service.login("alice@school.com", "password123").await,
        Err(EventlyError::Unauthorized)
    );
    assert!(services.auth_service.login("alice@school.com", &password).await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_deactivated_account_cannot_log_in() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    assert!(services.auth_service.login("alice@school.com", "password123").await.is_ok());

    services
        .user_service
        .toggle_status(&actor_for(&root), alice.id)
        .await
        .unwrap();

    assert_matches!(
        services.auth_service.login("alice@school.com", "password123").await,
        Err(EventlyError::Unauthorized)
    );
}

#[tokio::test]
#[serial]
async fn test_csv_export_renders_expected_columns() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    create_user(&services, &database, "Comma, Name", "comma@school.com", Role::User).await;

    let csv = services
        .user_service
        .export_csv(&actor_for(&root), &UserFilter::default())
        .await
        .unwrap();

    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), "ID,Name,Email,Role,Status,Created At");

    let root_line = lines.next().unwrap();
    assert!(root_line.contains("Root"));
    assert!(root_line.contains("super_admin"));
    assert!(root_line.contains("Active"));

    // Names containing separators are quoted
    let comma_line = lines.next().unwrap();
    assert!(comma_line.contains("\"Comma, Name\""));
}

#[tokio::test]
#[serial]
async fn test_csv_export_honors_filters() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let root = create_user(&services, &database, "Root", "root@school.com", Role::SuperAdmin).await;
    create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;
    create_user(&services, &database, "Bob", "bob@school.com", Role::Admin).await;

    let filter = UserFilter {
        role: Some(Role::User),
        ..UserFilter::default()
    };

    let csv = services
        .user_service
        .export_csv(&actor_for(&root), &filter)
        .await
        .unwrap();

    assert!(csv.contains("alice@school.com"));
    assert!(!csv.contains("bob@school.com"));
    assert!(!csv.contains("root@school.com"));
}

#[tokio::test]
#[serial]
async fn test_self_registration_forces_user_role() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());

    let (user, token) = services
        .auth_service
        .self_register("Mallory", "mallory@school.com", "password123")
        .await
        .unwrap();

    assert_eq!(user.role, Role::User);
    assert!(user.is_active);

    let actor = services.auth_service.verify_token(&token).unwrap();
    assert_eq!(actor.id, user.id);
    assert_eq!(actor.role, Role::User);
}

#[tokio::test]
#[serial]
async fn test_bootstrap_super_admin_runs_once() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let created = services.auth_service.bootstrap_super_admin().await.unwrap();
    let bootstrap = created.expect("bootstrap admin should be created on an empty table");
    assert_eq!(bootstrap.role, Role::SuperAdmin);

    // Second start is a no-op
    assert!(services.auth_service.bootstrap_super_admin().await.unwrap().is_none());
    assert_eq!(database.users.count_all().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_profile_update_cannot_escalate_role() {
    let db = TestDatabase::new().await.unwrap();
    let services = build_services(db.pool.clone());
    let database = DatabaseService::new(db.pool.clone());

    let alice = create_user(&services, &database, "Alice", "alice@school.com", Role::User).await;

    let request = UpdateUserRequest {
        name: Some("Alice Cooper".to_string()),
        role: Some(Role::SuperAdmin),
        is_active: Some(false),
        ..UpdateUserRequest::default()
    };

    let updated = services
        .user_service
        .update_own_profile(&actor_for(&alice), request)
        .await
        .unwrap();

    assert_eq!(updated.name, "Alice Cooper");
    assert_eq!(updated.role, Role::User);
    assert!(updated.is_active);
}
