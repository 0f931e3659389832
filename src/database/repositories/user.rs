//! User repository implementation

use sqlx::{PgPool, QueryBuilder, Postgres};
use chrono::Utc;
use crate::models::user::{User, UserFilter, Role};
use crate::utils::errors::EventlyError;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";

const EMAIL_CONSTRAINT: &str = "users_email_key";

const CREATED_BY_CONSTRAINT: &str = "events_created_by_fkey";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already-hashed credential
    pub async fn create(&self, name: &str, email: &str, password_hash: &str, role: Role, is_active: bool) -> Result<User, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(is_active)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user profile fields; absent fields are left unchanged
    pub async fn update(&self, id: i64, name: Option<String>, email: Option<String>, role: Option<Role>, is_active: Option<bool>) -> Result<Option<User>, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        Ok(user)
    }

    /// Replace the stored credential hash
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<Option<User>, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Activate or deactivate a user
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<User>, EventlyError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a user and cascade to their registrations in one transaction
    pub async fn delete(&self, id: i64) -> Result<(), EventlyError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_registrations WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_creator_conflict)?;

        tx.commit().await?;

        Ok(())
    }

    /// List users with role/status/search filters and pagination
    pub async fn list(&self, filter: &UserFilter, limit: i64, offset: i64) -> Result<Vec<User>, EventlyError> {
        let mut builder = Self::filtered_query(&format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"), filter);

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    /// List every user matching the filters, for the CSV export
    pub async fn list_for_export(&self, filter: &UserFilter) -> Result<Vec<User>, EventlyError> {
        let mut builder = Self::filtered_query(&format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"), filter);
        builder.push(" ORDER BY id ASC");

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    /// Count users matching the filters
    pub async fn count(&self, filter: &UserFilter) -> Result<i64, EventlyError> {
        let mut builder = Self::filtered_query("SELECT COUNT(*) FROM users WHERE TRUE", filter);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    /// Activate or deactivate many users at once
    pub async fn bulk_set_active(&self, ids: &[i64], is_active: bool) -> Result<u64, EventlyError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE id = ANY($1)"
        )
        .bind(ids)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete many users and their registrations in one transaction
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, EventlyError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_registrations WHERE user_id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await
            .map_err(map_creator_conflict)?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Total number of users, unfiltered
    pub async fn count_all(&self) -> Result<i64, EventlyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    fn filtered_query<'a>(base: &str, filter: &'a UserFilter) -> QueryBuilder<'a, Postgres> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(base);

        if let Some(role) = filter.role {
            builder.push(" AND role = ");
            builder.push_bind(role);
        }

        if let Some(is_active) = filter.is_active {
            builder.push(" AND is_active = ");
            builder.push_bind(is_active);
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR email ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder
    }
}

/// Map a created_by reference violation to a conflict the caller can surface
fn map_creator_conflict(err: sqlx::Error) -> EventlyError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(CREATED_BY_CONSTRAINT) => {
            EventlyError::Conflict("Cannot delete a user who has created events".to_string())
        }
        _ => err.into(),
    }
}

/// Map a unique-email violation to a conflict the caller can surface
fn map_email_conflict(err: sqlx::Error) -> EventlyError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(EMAIL_CONSTRAINT) => {
            EventlyError::Conflict("A user with this email already exists".to_string())
        }
        _ => err.into(),
    }
}
