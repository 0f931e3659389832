//! Category service implementation

use tracing::info;

use crate::database::repositories::CategoryRepository;
use crate::models::category::{CreateCategoryRequest, EventCategory, UpdateCategoryRequest};
use crate::services::policy::{authorize, Action, Actor};
use crate::utils::errors::{EventlyError, Result, ValidationErrors};

/// Category service for the descriptive event taxonomy
#[derive(Clone)]
pub struct CategoryService {
    category_repository: CategoryRepository,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(category_repository: CategoryRepository) -> Self {
        Self {
            category_repository,
        }
    }

    /// Create a category
    pub async fn create_category(&self, actor: &Actor, request: CreateCategoryRequest) -> Result<EventCategory> {
        authorize(Some(actor), Action::ManageCategories)?;

        let mut errors = ValidationErrors::new();
        if request.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        errors.finish()?;

        let category = self.category_repository.create(request).await?;
        info!(category_id = category.id, actor_id = actor.id, "Category created");

        Ok(category)
    }

    /// Update a category; absent fields are left unchanged
    pub async fn update_category(&self, actor: &Actor, id: i64, request: UpdateCategoryRequest) -> Result<EventCategory> {
        authorize(Some(actor), Action::ManageCategories)?;

        if let Some(ref name) = request.name {
            let mut errors = ValidationErrors::new();
            if name.trim().is_empty() {
                errors.add("name", "Name is required");
            }
            errors.finish()?;
        }

        let category = self
            .category_repository
            .update(id, request)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Category", id })?;

        info!(category_id = id, actor_id = actor.id, "Category updated");

        Ok(category)
    }

    /// Delete a category; events referencing it fall back to no category
    pub async fn delete_category(&self, actor: &Actor, id: i64) -> Result<()> {
        authorize(Some(actor), Action::ManageCategories)?;

        self.category_repository
            .find_by_id(id)
            .await?
            .ok_or(EventlyError::NotFound { resource: "Category", id })?;

        self.category_repository.delete(id).await?;
        info!(category_id = id, actor_id = actor.id, "Category deleted");

        Ok(())
    }

    /// Active categories for the public listing
    pub async fn list_active(&self) -> Result<Vec<EventCategory>> {
        self.category_repository.list_active().await
    }

    /// Every category for the admin views
    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<EventCategory>> {
        authorize(Some(actor), Action::ManageCategories)?;
        self.category_repository.list_all().await
    }
}
