//! Like handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::LikeRequest;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/likes
pub async fn like_post(
    state: web::Data<AppState>,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    state.likes.like_post(body.into_inner()).await?;
    Ok(HttpResponse::Created().finish())
}

/// DELETE /api/likes/post/{post_id}/user/{user_id}
pub async fn unlike_post(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    state.likes.unlike_post(user_id, post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/likes/post/{post_id}/count
pub async fn count_likes(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let count = state.likes.count_likes(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(count))
}
