//! User service implementation
//!
//! This service handles user administration (super-admin tier): CRUD, status
//! toggling, password resets, bulk actions, and the CSV export. It also
//! carries the self-service profile operations available to every account.
//!
//! Self-protection rule: the acting account can never deactivate, delete, or
//! bulk-select itself. A batch containing the actor is rejected whole.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User, UserFilter};
use crate::services::auth::AuthService;
use crate::services::policy::{authorize, Action, Actor};
use crate::utils::errors::{EventlyError, Result, ValidationErrors};
use crate::utils::helpers::{calculate_offset, csv_field, format_timestamp, generate_random_string, is_valid_email};

const MIN_PASSWORD_LENGTH: usize = 8;
const RESET_PASSWORD_LENGTH: usize = 10;

/// What a bulk action does to every selected account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

/// A page of users with the total match count for pagination
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// User service for administration and self-service profiles
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    auth_service: AuthService,
    settings: Settings,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository, auth_service: AuthService, settings: Settings) -> Self {
        Self {
            user_repository,
            auth_service,
            settings,
        }
    }

    /// Create an account with an explicit role and status
    pub async fn create_user(&self, actor: &Actor, request: CreateUserRequest) -> Result<User> {
        authorize(Some(actor), Action::ManageUsers)?;

        let mut errors = ValidationErrors::new();
        if request.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if !is_valid_email(&request.email) {
            errors.add("email", "Email address is invalid");
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 8 characters");
        }
        errors.finish()?;

        let password_hash = self.auth_service.hash_password(&request.password)?;
        let user = self
            .user_repository
            .create(request.name.trim(), &request.email, &password_hash, request.role, request.is_active)
            .await
            .map_err(email_conflict_to_validation)?;

        info!(user_id = user.id, actor_id = actor.id, role = %user.role, "User created");

        Ok(user)
    }

    /// Get a single account
    pub async fn get_user(&self, actor: &Actor, id: i64) -> Result<User> {
        authorize(Some(actor), Action::ManageUsers)?;

        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id })
    }

    /// Update an account; absent fields are left unchanged.
    ///
    /// Deactivating the acting account this way is rejected, same as the
    /// dedicated toggle.
    pub async fn update_user(&self, actor: &Actor, id: i64, request: UpdateUserRequest) -> Result<User> {
        authorize(Some(actor), Action::ManageUsers)?;

        let UpdateUserRequest { name, email, password, role, is_active } = request;

        if id == actor.id && is_active == Some(false) {
            return Err(self_protection("deactivate"));
        }

        let mut errors = ValidationErrors::new();
        if let Some(ref name) = name {
            if name.trim().is_empty() {
                errors.add("name", "Name is required");
            }
        }
        if let Some(ref email) = email {
            if !is_valid_email(email) {
                errors.add("email", "Email address is invalid");
            }
        }
        if let Some(ref password) = password {
            if password.len() < MIN_PASSWORD_LENGTH {
                errors.add("password", "Password must be at least 8 characters");
            }
        }
        errors.finish()?;

        let user = self
            .user_repository
            .update(id, name.map(|n| n.trim().to_string()), email, role, is_active)
            .await
            .map_err(email_conflict_to_validation)?
            .ok_or(EventlyError::NotFound { resource: "User", id })?;

        let user = match password.filter(|p| !p.is_empty()) {
            Some(password) => {
                let hash = self.auth_service.hash_password(&password)?;
                self.user_repository
                    .update_password(id, &hash)
                    .await?
                    .ok_or(EventlyError::NotFound { resource: "User", id })?
            }
            None => user,
        };

        info!(user_id = id, actor_id = actor.id, "User updated");

        Ok(user)
    }

    /// Delete an account and its registrations
    pub async fn delete_user(&self, actor: &Actor, id: i64) -> Result<()> {
        authorize(Some(actor), Action::ManageUsers)?;

        if id == actor.id {
            return Err(self_protection("delete"));
        }

        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id })?;

        self.user_repository.delete(id).await?;
        info!(user_id = id, actor_id = actor.id, "User deleted");

        Ok(())
    }

    /// Flip an account between active and inactive
    pub async fn toggle_status(&self, actor: &Actor, id: i64) -> Result<User> {
        authorize(Some(actor), Action::ManageUsers)?;

        if id == actor.id {
            return Err(self_protection("deactivate"));
        }

        let user = self
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id })?;

        let user = self
            .user_repository
            .set_active(id, !user.is_active)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id })?;

        info!(user_id = id, actor_id = actor.id, is_active = user.is_active, "User status toggled");

        Ok(user)
    }

    /// Replace an account's credential with a random one.
    ///
    /// The plaintext is returned exactly once and never stored.
    pub async fn reset_password(&self, actor: &Actor, id: i64) -> Result<String> {
        authorize(Some(actor), Action::ManageUsers)?;

        let password = generate_random_string(RESET_PASSWORD_LENGTH);
        let hash = self.auth_service.hash_password(&password)?;

        self.user_repository
            .update_password(id, &hash)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id })?;

        info!(user_id = id, actor_id = actor.id, "Password reset");

        Ok(password)
    }

    /// Apply one action to a batch of accounts.
    ///
    /// A batch containing the acting account is rejected whole; no partial
    /// application.
    pub async fn bulk_action(&self, actor: &Actor, action: BulkAction, ids: &[i64]) -> Result<u64> {
        authorize(Some(actor), Action::ManageUsers)?;

        if ids.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("ids", "At least one user must be selected");
            return errors.finish().map(|_| 0);
        }

        if ids.contains(&actor.id) {
            warn!(actor_id = actor.id, "Bulk action refused: batch contains the acting account");
            return Err(EventlyError::Conflict(
                "You cannot include your own account in a bulk action".to_string(),
            ));
        }

        let affected = match action {
            BulkAction::Activate => self.user_repository.bulk_set_active(ids, true).await?,
            BulkAction::Deactivate => self.user_repository.bulk_set_active(ids, false).await?,
            BulkAction::Delete => self.user_repository.bulk_delete(ids).await?,
        };

        info!(actor_id = actor.id, action = ?action, affected, "Bulk action applied");

        Ok(affected)
    }

    /// List accounts with role/status/search filters and pagination
    pub async fn list_users(&self, actor: &Actor, filter: &UserFilter, page: i64) -> Result<UserPage> {
        authorize(Some(actor), Action::ManageUsers)?;

        let per_page = self.settings.pagination.users_per_page;
        let offset = calculate_offset(page, per_page);

        let users = self.user_repository.list(filter, per_page, offset).await?;
        let total = self.user_repository.count(filter).await?;

        Ok(UserPage {
            users,
            total,
            page: page.max(1),
            per_page,
        })
    }

    /// Render every account matching the filters as CSV.
    ///
    /// Same filters as the listing; rows ordered by id.
    pub async fn export_csv(&self, actor: &Actor, filter: &UserFilter) -> Result<String> {
        authorize(Some(actor), Action::ManageUsers)?;

        let users = self.user_repository.list_for_export(filter).await?;
        debug!(actor_id = actor.id, rows = users.len(), "Exporting users as CSV");

        let mut csv = String::from("ID,Name,Email,Role,Status,Created At\n");
        for user in &users {
            let status = if user.is_active { "Active" } else { "Inactive" };
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                user.id,
                csv_field(&user.name),
                csv_field(&user.email),
                user.role,
                status,
                format_timestamp(user.created_at),
            ));
        }

        Ok(csv)
    }

    /// The acting user's own account
    pub async fn get_own_profile(&self, actor: &Actor) -> Result<User> {
        authorize(Some(actor), Action::ManageOwnProfile)?;

        self.user_repository
            .find_by_id(actor.id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "User", id: actor.id })
    }

    /// Self-service profile update; role and status changes are ignored
    pub async fn update_own_profile(&self, actor: &Actor, request: UpdateUserRequest) -> Result<User> {
        authorize(Some(actor), Action::ManageOwnProfile)?;

        let request = UpdateUserRequest {
            role: None,
            is_active: None,
            ..request
        };

        let mut errors = ValidationErrors::new();
        if let Some(ref name) = request.name {
            if name.trim().is_empty() {
                errors.add("name", "Name is required");
            }
        }
        if let Some(ref email) = request.email {
            if !is_valid_email(email) {
                errors.add("email", "Email address is invalid");
            }
        }
        if let Some(ref password) = request.password {
            if password.len() < MIN_PASSWORD_LENGTH {
                errors.add("password", "Password must be at least 8 characters");
            }
        }
        errors.finish()?;

        let user = self
            .user_repository
            .update(actor.id, request.name.clone().map(|n| n.trim().to_string()), request.email.clone(), None, None)
            .await
            .map_err(email_conflict_to_validation)?
            .ok_or(EventlyError::NotFound { resource: "User", id: actor.id })?;

        let user = match request.password {
            Some(ref password) => {
                let hash = self.auth_service.hash_password(password)?;
                self.user_repository
                    .update_password(actor.id, &hash)
                    .await?
                    .ok_or(EventlyError::NotFound { resource: "User", id: actor.id })?
            }
            None => user,
        };

        info!(user_id = actor.id, "Profile updated");

        Ok(user)
    }
}

fn self_protection(what: &str) -> EventlyError {
    EventlyError::Conflict(format!("You cannot {} your own account", what))
}

/// A unique-email conflict on create/update surfaces as a field-keyed
/// validation failure, like the other field constraints
fn email_conflict_to_validation(err: EventlyError) -> EventlyError {
    match err {
        EventlyError::Conflict(_) => {
            let mut errors = ValidationErrors::new();
            errors.add("email", "A user with this email already exists");
            EventlyError::Validation(errors)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_conflict_becomes_validation() {
        let err = email_conflict_to_validation(EventlyError::Conflict("dup".to_string()));
        match err {
            EventlyError::Validation(v) => assert!(v.fields().contains_key("email")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = email_conflict_to_validation(EventlyError::Unauthorized);
        assert!(matches!(err, EventlyError::Unauthorized));
    }
}
