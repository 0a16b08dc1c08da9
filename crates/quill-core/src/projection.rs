//! Read-only projections produced by the stores.
//!
//! Each projection exposes a strict subset of an entity's fields, with at
//! most one level of related-entity subfields.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::scope::Lazy;

/// Field selection of a post with its category folded in.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Lazy<CategorySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
}

/// A comment with its author joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub post_id: Uuid,
}

/// Comments plus likes for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub user_id: Uuid,
    pub user_name: String,
    pub activity_count: i64,
}

/// A post loaded together with its author and comments.
#[derive(Debug, Clone)]
pub struct PostGraph {
    pub post: crate::domain::Post,
    pub author: crate::domain::User,
    pub comments: Vec<CommentView>,
}
