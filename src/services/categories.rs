use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{category, Category, CategoryModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::derive_slug,
};

/// Category administration service
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists categories ordered by display order, then name. Inactive
    /// categories are only included on request (admin listings).
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<CategoryModel>, ServiceError> {
        let mut query = Category::find();
        if !include_inactive {
            query = query.filter(category::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(category::Column::DisplayOrder)
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Gets a category by ID
    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))
    }

    /// Creates a new category. The slug derives from the name unless
    /// supplied; the display order defaults to the end of the list.
    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name cannot be blank".to_string(),
            ));
        }

        let slug = derive_slug(input.slug.as_deref(), &name)?;
        self.ensure_unique_slug(&slug, None).await?;

        let display_order = match input.display_order {
            Some(order) => order,
            None => Category::find().count(&*self.db).await? as i32 + 1,
        };

        let now = Utc::now();
        let category_id = Uuid::new_v4();
        let category = category::ActiveModel {
            id: Set(category_id),
            name: Set(name),
            slug: Set(slug),
            description: Set(input.description),
            image_url: Set(input.image_url),
            display_order: Set(display_order),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = category.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category_id))
            .await;

        info!("Created category: {}", category_id);
        Ok(category)
    }

    /// Updates an existing category. A new name re-derives the slug unless
    /// an explicit slug accompanies it.
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let existing = self.get_category(category_id).await?;

        let name = match input.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "Category name cannot be blank".to_string(),
                    ));
                }
                Some(name)
            }
            None => None,
        };

        let slug = match (&input.slug, &name) {
            (Some(explicit), _) => Some(derive_slug(
                Some(explicit),
                name.as_deref().unwrap_or(&existing.name),
            )?),
            (None, Some(new_name)) => Some(derive_slug(None, new_name)?),
            (None, None) => None,
        };
        if let Some(ref slug) = slug {
            if *slug != existing.slug {
                self.ensure_unique_slug(slug, Some(category_id)).await?;
            }
        }

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(display_order) = input.display_order {
            active.display_order = Set(display_order);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let category = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryUpdated(category_id))
            .await;

        info!("Updated category: {}", category_id);
        Ok(category)
    }

    /// Deletes a category. Products referencing it keep existing with their
    /// category cleared (enforced by the schema's ON DELETE SET NULL).
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let category = self.get_category(category_id).await?;
        category.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryDeleted(category_id))
            .await;

        info!("Deleted category: {}", category_id);
        Ok(())
    }

    async fn ensure_unique_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Category::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category slug '{}' already exists",
                slug
            )));
        }

        Ok(())
    }
}

/// Input for creating a category
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Input for updating a category
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}
