//! Projection → DTO mappers.
//!
//! Every mapper produces a flat, boundary-facing shape. Services call them
//! exactly once per record, before the read scope that produced the
//! record closes.

use quill_shared::dto::{
    CategoryDto, CategorySummaryDto, CommentDto, PostDetailDto, PostDto, PostWithAuthorDto,
    UserActivityDto, UserDto, UserSummaryDto,
};

use crate::domain::{Category, Post, User};
use crate::error::RepoError;
use crate::projection::{CategorySummary, CommentView, PostGraph, PostView, UserActivity, UserSummary};

/// Flatten a post view. An absent category yields null id and name; a
/// category read outside its scope propagates the store's error.
pub fn to_post_dto(view: &PostView) -> Result<PostDto, RepoError> {
    let category = view.category.get()?;
    Ok(PostDto {
        id: view.id,
        title: view.title.clone(),
        content: view.content.clone(),
        category_id: category.map(|c| c.id),
        category_name: category.map(|c| c.name.clone()),
    })
}

pub fn to_category_dto(category: &Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name.clone(),
        description: category.description.clone(),
    }
}

pub fn to_category_summary_dto(summary: &CategorySummary) -> CategorySummaryDto {
    CategorySummaryDto {
        id: summary.id,
        name: summary.name.clone(),
    }
}

/// Entity-level post mapping; the category name is not loaded on this path.
pub fn to_post_summary_dto(post: &Post) -> PostDto {
    PostDto {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        category_id: post.category_id,
        category_name: None,
    }
}

pub fn to_user_dto(user: &User, posts: &[Post]) -> UserDto {
    UserDto {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        posts: posts.iter().map(to_post_summary_dto).collect(),
    }
}

pub fn to_user_summary_dto(summary: &UserSummary) -> UserSummaryDto {
    UserSummaryDto {
        id: summary.id,
        name: summary.name.clone(),
        email: summary.email.clone(),
    }
}

pub fn to_comment_dto(view: &CommentView) -> CommentDto {
    CommentDto {
        id: view.id,
        text: view.text.clone(),
        user_id: view.author.id,
        user_name: view.author.name.clone(),
        post_id: view.post_id,
        created_at: view.created_at,
    }
}

pub fn to_post_detail_dto(graph: &PostGraph) -> PostDetailDto {
    PostDetailDto {
        id: graph.post.id,
        title: graph.post.title.clone(),
        content: graph.post.content.clone(),
        category_id: graph.post.category_id,
        author_id: graph.author.id,
        author_name: graph.author.name.clone(),
        comments: graph.comments.iter().map(to_comment_dto).collect(),
    }
}

pub fn to_post_with_author_dto(post: &Post, author: &User) -> PostWithAuthorDto {
    PostWithAuthorDto {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        author_id: author.id,
        author_name: author.name.clone(),
    }
}

pub fn to_activity_dto(activity: &UserActivity) -> UserActivityDto {
    UserActivityDto {
        user_id: activity.user_id,
        user_name: activity.user_name.clone(),
        activity_count: activity.activity_count,
    }
}
