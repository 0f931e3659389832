//! Authentication service implementation
//!
//! This service handles credential hashing, session token issuance and
//! verification, login, self-service signup, and the bootstrap super admin
//! created on first start.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::user::{Role, User};
use crate::services::policy::Actor;
use crate::utils::errors::{EventlyError, Result, ValidationErrors};
use crate::utils::helpers::is_valid_email;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub role: Role,
    /// Expiry as a unix timestamp
    pub exp: i64,
    pub iat: i64,
}

/// Authentication service for login, signup, and session tokens
#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    settings: Settings,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(user_repository: UserRepository, settings: Settings) -> Self {
        Self {
            user_repository,
            settings,
        }
    }

    /// Hash a plaintext credential with Argon2id and a fresh salt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| EventlyError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a plaintext credential against a stored hash
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| EventlyError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Issue a signed session token for a user
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: (now + Duration::hours(self.settings.auth.token_ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.auth.token_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify a session token and return the actor it identifies
    pub fn verify_token(&self, token: &str) -> Result<Actor> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.auth.token_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!(error = %e, "Session token rejected");
            EventlyError::Unauthorized
        })?;

        Ok(Actor {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }

    /// Authenticate an email/password pair and issue a session token.
    ///
    /// A wrong email, a wrong password, and a deactivated account all fail
    /// the same way so login errors do not leak which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        debug!(email = %email, "Login attempt");

        let user = match self.user_repository.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!(email = %email, "Login failed: unknown email");
                return Err(EventlyError::Unauthorized);
            }
        };

        if !self.verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(EventlyError::Unauthorized);
        }

        if !user.is_active {
            warn!(user_id = user.id, "Login failed: account deactivated");
            return Err(EventlyError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok((user, token))
    }

    /// Self-service signup. The role is always `user` regardless of what the
    /// caller sends; elevated roles are only granted through user
    /// administration.
    pub async fn self_register(&self, name: &str, email: &str, password: &str) -> Result<(User, String)> {
        debug!(email = %email, "Signup attempt");

        let mut errors = ValidationErrors::new();
        if name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if !is_valid_email(email) {
            errors.add("email", "Email address is invalid");
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 8 characters");
        }
        errors.finish()?;

        let password_hash = self.hash_password(password)?;
        let user = self
            .user_repository
            .create(name.trim(), email, &password_hash, Role::User, true)
            .await?;

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, "New user signed up");

        Ok((user, token))
    }

    /// Create the bootstrap super admin if the users table is empty.
    ///
    /// Runs on every start; a non-empty table makes it a no-op, so the
    /// bootstrap account only ever exists once.
    pub async fn bootstrap_super_admin(&self) -> Result<Option<User>> {
        if self.user_repository.count_all().await? > 0 {
            return Ok(None);
        }

        let email = self.settings.auth.bootstrap_admin_email.clone();
        let password_hash = self.hash_password(&self.settings.auth.bootstrap_admin_password)?;

        let user = self
            .user_repository
            .create("Super Admin", &email, &password_hash, Role::SuperAdmin, true)
            .await?;

        info!(user_id = user.id, email = %email, "Bootstrap super admin created");

        Ok(Some(user))
    }
}
