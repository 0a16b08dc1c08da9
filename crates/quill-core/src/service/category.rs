use std::sync::Arc;

use uuid::Uuid;

use quill_shared::dto::{CategoryDto, CategorySummaryDto, CreateCategoryRequest, PostDto};

use crate::domain::Category;
use crate::error::DomainError;
use crate::mapping;
use crate::ports::{CategoryRepository, PostRepository};
use crate::scope::ReadScope;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { categories, posts }
    }

    pub async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<CategoryDto, DomainError> {
        if self.categories.find_by_name(&req.name).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "Category '{}' already exists",
                req.name
            )));
        }

        let saved = self
            .categories
            .save(Category::new(req.name, req.description))
            .await?;
        tracing::debug!(category_id = %saved.id, "Created category");
        Ok(mapping::to_category_dto(&saved))
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryDto>, DomainError> {
        let categories = self.categories.find_all().await?;
        Ok(categories.iter().map(mapping::to_category_dto).collect())
    }

    pub async fn posts_by_category(&self, category_id: Uuid) -> Result<Vec<PostDto>, DomainError> {
        if !self.categories.exists(category_id).await? {
            return Err(DomainError::not_found("Category", category_id));
        }

        let scope = ReadScope::begin("posts_by_category");
        let views = self.posts.find_views_by_category(&scope, category_id).await?;
        let dtos = views
            .iter()
            .map(mapping::to_post_dto)
            .collect::<Result<Vec<_>, _>>()?;
        scope.close();
        Ok(dtos)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CategorySummaryDto>, DomainError> {
        let summary = self.categories.find_by_name(name).await?;
        Ok(summary.as_ref().map(mapping::to_category_summary_dto))
    }
}
