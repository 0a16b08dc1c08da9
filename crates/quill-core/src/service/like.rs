use std::sync::Arc;

use uuid::Uuid;

use quill_shared::dto::{LikeRequest, UserActivityDto};

use crate::domain::PostLike;
use crate::error::DomainError;
use crate::mapping;
use crate::ports::{PostLikeRepository, PostRepository, UserRepository};

/// Rows returned by the active-users report.
pub const TOP_ACTIVE_USERS_LIMIT: u64 = 5;

pub struct PostLikeService {
    likes: Arc<dyn PostLikeRepository>,
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl PostLikeService {
    pub fn new(
        likes: Arc<dyn PostLikeRepository>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self { likes, users, posts }
    }

    pub async fn like_post(&self, req: LikeRequest) -> Result<(), DomainError> {
        if self
            .likes
            .exists_by_user_and_post(req.user_id, req.post_id)
            .await?
        {
            return Err(DomainError::Duplicate(
                "User already liked this post".to_string(),
            ));
        }
        if !self.users.exists(req.user_id).await? {
            return Err(DomainError::not_found("User", req.user_id));
        }
        if !self.posts.exists(req.post_id).await? {
            return Err(DomainError::not_found("Post", req.post_id));
        }

        self.likes
            .save(PostLike::new(req.user_id, req.post_id))
            .await?;
        tracing::debug!(user_id = %req.user_id, post_id = %req.post_id, "Liked post");
        Ok(())
    }

    /// Removing a like that does not exist is not an error.
    pub async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let removed = self.likes.delete_by_user_and_post(user_id, post_id).await?;
        tracing::debug!(user_id = %user_id, post_id = %post_id, removed, "Unliked post");
        Ok(())
    }

    pub async fn count_likes(&self, post_id: Uuid) -> Result<u64, DomainError> {
        Ok(self.likes.count_by_post(post_id).await?)
    }

    pub async fn top_active_users(&self) -> Result<Vec<UserActivityDto>, DomainError> {
        let rows = self.likes.top_active_users(TOP_ACTIVE_USERS_LIMIT).await?;
        Ok(rows.iter().map(mapping::to_activity_dto).collect())
    }
}
