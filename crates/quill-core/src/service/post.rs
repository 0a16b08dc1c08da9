use std::sync::Arc;

use uuid::Uuid;

use quill_shared::dto::{
    CreatePostRequest, PostDetailDto, PostDto, PostSearchParams, PostWithAuthorDto,
};
use quill_shared::{Page, PageRequest};

use crate::domain::Post;
use crate::error::DomainError;
use crate::mapping;
use crate::ports::{CategoryRepository, PostRepository, UserRepository};
use crate::query::{has_category, title_contains};
use crate::scope::ReadScope;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            categories,
        }
    }

    /// Create a post for an existing user, optionally filed under an
    /// existing category.
    pub async fn create_post(
        &self,
        user_id: Uuid,
        req: CreatePostRequest,
    ) -> Result<PostDto, DomainError> {
        DomainError::require_text("Title", &req.title)?;
        DomainError::require_text("Content", &req.content)?;
        if !self.users.exists(user_id).await? {
            return Err(DomainError::not_found("User", user_id));
        }

        let mut post = Post::new(user_id, req.title, req.content);
        let mut category_name = None;
        if let Some(category_id) = req.category_id {
            let category = self
                .categories
                .find_by_id(category_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Category", category_id))?;
            post = post.with_category(category.id);
            category_name = Some(category.name);
        }

        let saved = self.posts.save(post).await?;
        tracing::debug!(post_id = %saved.id, user_id = %user_id, "Created post");

        let mut dto = mapping::to_post_summary_dto(&saved);
        dto.category_name = category_name;
        Ok(dto)
    }

    /// Posts of one user, one page at a time.
    pub async fn posts_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostDto>, DomainError> {
        if !self.users.exists(user_id).await? {
            return Err(DomainError::not_found("User", user_id));
        }

        let scope = ReadScope::begin("posts_by_user");
        let views = self.posts.find_views_by_user(&scope, user_id, page).await?;
        let dtos = views.try_map(|view| mapping::to_post_dto(&view))?;
        scope.close();
        Ok(dtos)
    }

    /// Search by optional title keyword and optional exact category name.
    pub async fn search(
        &self,
        params: &PostSearchParams,
        page: PageRequest,
    ) -> Result<Page<PostDto>, DomainError> {
        let predicate = title_contains(params.keyword.as_deref())
            .and(has_category(params.category.as_deref()));
        tracing::debug!(?predicate, "Searching posts");

        let scope = ReadScope::begin("search_posts");
        let views = self.posts.search(&scope, &predicate, page).await?;
        let dtos = views.try_map(|view| mapping::to_post_dto(&view))?;
        scope.close();
        Ok(dtos)
    }

    pub async fn get_post_detail(&self, id: Uuid) -> Result<PostDetailDto, DomainError> {
        let graph = self
            .posts
            .find_with_user_and_comments(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        Ok(mapping::to_post_detail_dto(&graph))
    }

    pub async fn list_with_authors(&self) -> Result<Vec<PostWithAuthorDto>, DomainError> {
        let rows = self.posts.find_all_with_user().await?;
        Ok(rows
            .iter()
            .map(|(post, author)| mapping::to_post_with_author_dto(post, author))
            .collect())
    }
}
