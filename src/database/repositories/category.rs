//! Event category repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::category::{EventCategory, CreateCategoryRequest, UpdateCategoryRequest};
use crate::utils::errors::EventlyError;

const CATEGORY_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(&self, request: CreateCategoryRequest) -> Result<EventCategory, EventlyError> {
        let category = sqlx::query_as::<_, EventCategory>(&format!(
            r#"
            INSERT INTO event_categories (name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.description)
        .bind(request.is_active)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<EventCategory>, EventlyError> {
        let category = sqlx::query_as::<_, EventCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM event_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Update category fields; absent fields are left unchanged
    pub async fn update(&self, id: i64, request: UpdateCategoryRequest) -> Result<Option<EventCategory>, EventlyError> {
        let category = sqlx::query_as::<_, EventCategory>(&format!(
            r#"
            UPDATE event_categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = $5
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Delete a category; referencing events fall back to no category
    pub async fn delete(&self, id: i64) -> Result<(), EventlyError> {
        sqlx::query("DELETE FROM event_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List active categories for the public listing
    pub async fn list_active(&self) -> Result<Vec<EventCategory>, EventlyError> {
        let categories = sqlx::query_as::<_, EventCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM event_categories WHERE is_active = TRUE ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// List every category for the admin views
    pub async fn list_all(&self) -> Result<Vec<EventCategory>, EventlyError> {
        let categories = sqlx::query_as::<_, EventCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM event_categories ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
