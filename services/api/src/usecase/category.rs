use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::{
    Category, CategoryNode, MAX_CATEGORY_NAME_LEN, build_category_tree, creates_cycle,
};
use crate::error::ApiServiceError;

fn validate_name(raw: &str) -> Result<String, ApiServiceError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_CATEGORY_NAME_LEN {
        return Err(ApiServiceError::invalid(format!(
            "name must be 1-{MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

fn clean_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_owned()).filter(|d| !d.is_empty())
}

// ── ListCategories ───────────────────────────────────────────────────────────

pub enum CategoryListing {
    Flat(Vec<Category>),
    Tree(Vec<CategoryNode>),
}

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self, tree: bool) -> Result<CategoryListing, ApiServiceError> {
        let categories = self.repo.list().await?;
        Ok(if tree {
            CategoryListing::Tree(build_category_tree(categories))
        } else {
            CategoryListing::Flat(categories)
        })
    }
}

// ── GetCategory ──────────────────────────────────────────────────────────────

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, ApiServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::CategoryNotFound)
    }
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: Option<i32>,
}

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(&self, input: CreateCategoryInput) -> Result<Category, ApiServiceError> {
        let name = validate_name(&input.name)?;
        if let Some(parent_id) = input.parent_id {
            self.repo
                .find(parent_id)
                .await?
                .ok_or(ApiServiceError::CategoryNotFound)?;
        }
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name,
            description: clean_description(input.description),
            parent_id: input.parent_id,
            sort_order: input.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&category).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }
}

// ── UpdateCategory ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Move the category back to the top level.
    pub clear_parent: bool,
    pub sort_order: Option<i32>,
}

pub struct UpdateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> UpdateCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid, input: UpdateCategoryInput) -> Result<Category, ApiServiceError> {
        let all = self.repo.list().await?;
        let mut category = all
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ApiServiceError::CategoryNotFound)?;

        if let Some(name) = input.name.as_deref() {
            category.name = validate_name(name)?;
        }
        if input.description.is_some() {
            category.description = clean_description(input.description);
        }
        if let Some(sort_order) = input.sort_order {
            category.sort_order = sort_order;
        }
        if input.clear_parent {
            category.parent_id = None;
        } else if let Some(parent_id) = input.parent_id {
            if !all.iter().any(|c| c.id == parent_id) {
                return Err(ApiServiceError::CategoryNotFound);
            }
            if creates_cycle(&all, id, parent_id) {
                return Err(ApiServiceError::invalid(
                    "a category cannot be moved under itself or its descendants",
                ));
            }
            category.parent_id = Some(parent_id);
        }
        category.updated_at = Utc::now();

        self.repo.update(&category).await?;
        Ok(category)
    }
}

// ── DeleteCategory ───────────────────────────────────────────────────────────

pub struct DeleteCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> DeleteCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::CategoryNotFound)?;
        let (children, resources) =
            tokio::try_join!(self.repo.count_children(id), self.repo.count_resources(id))?;
        if children > 0 || resources > 0 {
            return Err(ApiServiceError::CategoryInUse);
        }
        if !self.repo.delete(id).await? {
            return Err(ApiServiceError::CategoryNotFound);
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}
