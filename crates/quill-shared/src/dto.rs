//! Data Transfer Objects - request/response types for the API.
//!
//! Every response shape is flat: related entities are folded into
//! `<relation>Id` / `<relation>Name` fields instead of nested objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "not_blank", message = "Name must not be blank"))]
    pub name: String,
    #[validate(email(message = "Email should be valid"))]
    pub email: String,
}

/// Request to create a post for an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(custom(function = "not_blank", message = "Title must not be blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Content must not be blank"))]
    pub content: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(custom(function = "not_blank", message = "Name must not be blank"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(custom(function = "not_blank", message = "Text must not be blank"))]
    pub text: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
}

/// Request to like a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Uuid,
    pub post_id: Uuid,
}

/// Optional filters for the post search endpoint. Missing or empty values
/// do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostSearchParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

/// A post as exposed at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummaryDto {
    pub id: Uuid,
    pub name: String,
}

/// A user together with the posts they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub posts: Vec<PostDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A post with its author and comments, loaded in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthorDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
}

/// One row of the "most active users" report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityDto {
    pub user_id: Uuid,
    pub user_name: String,
    pub activity_count: i64,
}
