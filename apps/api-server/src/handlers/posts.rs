//! Post handlers - creation, paginated listing, search and detail.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_shared::PageRequest;
use quill_shared::dto::{CreatePostRequest, PostSearchParams};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/users/{user_id}/posts
pub async fn create_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = state.posts.create_post(path.into_inner(), req).await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/users/{user_id}/posts?page=&size=
pub async fn posts_by_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    page: web::Query<PageRequest>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .posts_by_user(path.into_inner(), page.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts
pub async fn list_with_authors(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.posts.list_with_authors().await?))
}

/// GET /api/posts/search?keyword=&category=&page=&size=
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<PostSearchParams>,
    page: web::Query<PageRequest>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.search(&params, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}
