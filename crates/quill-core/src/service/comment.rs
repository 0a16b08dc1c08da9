use std::sync::Arc;

use uuid::Uuid;

use quill_shared::dto::{CommentDto, CreateCommentRequest};

use crate::domain::Comment;
use crate::error::DomainError;
use crate::mapping;
use crate::ports::{CommentRepository, PostRepository, UserRepository};
use crate::projection::{AuthorRef, CommentView};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            comments,
            users,
            posts,
        }
    }

    pub async fn add_comment(&self, req: CreateCommentRequest) -> Result<CommentDto, DomainError> {
        DomainError::require_text("Text", &req.text)?;
        let author = self
            .users
            .find_by_id(req.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", req.user_id))?;
        if !self.posts.exists(req.post_id).await? {
            return Err(DomainError::not_found("Post", req.post_id));
        }

        let saved = self
            .comments
            .save(Comment::new(req.text, author.id, req.post_id))
            .await?;
        tracing::debug!(comment_id = %saved.id, post_id = %saved.post_id, "Added comment");

        Ok(mapping::to_comment_dto(&CommentView {
            id: saved.id,
            text: saved.text,
            created_at: saved.created_at,
            author: AuthorRef {
                id: author.id,
                name: author.name,
            },
            post_id: saved.post_id,
        }))
    }

    /// Newest first. An unknown post simply has no comments.
    pub async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentDto>, DomainError> {
        let views = self.comments.find_views_by_post(post_id).await?;
        Ok(views.iter().map(mapping::to_comment_dto).collect())
    }
}
