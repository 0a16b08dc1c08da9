use std::sync::Arc;

use uuid::Uuid;

use quill_shared::dto::{CreateUserRequest, UserDto, UserSummaryDto};

use crate::domain::User;
use crate::error::DomainError;
use crate::mapping;
use crate::ports::{PostRepository, UserRepository};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<UserDto, DomainError> {
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()));
        }

        let saved = self.users.save(User::new(req.name, req.email)).await?;
        tracing::debug!(user_id = %saved.id, "Created user");
        Ok(mapping::to_user_dto(&saved, &[]))
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>, DomainError> {
        let users = self.users.find_all_with_posts().await?;
        Ok(users
            .iter()
            .map(|(user, posts)| mapping::to_user_dto(user, posts))
            .collect())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserDto, DomainError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;
        let posts = self.posts.find_by_user_id(id).await?;
        Ok(mapping::to_user_dto(&user, &posts))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.users.exists(id).await? {
            return Err(DomainError::not_found("User", id));
        }
        self.users.delete(id).await?;
        tracing::debug!(user_id = %id, "Deleted user");
        Ok(())
    }

    pub async fn list_summaries(&self) -> Result<Vec<UserSummaryDto>, DomainError> {
        let summaries = self.users.find_all_summaries().await?;
        Ok(summaries.iter().map(mapping::to_user_summary_dto).collect())
    }
}
