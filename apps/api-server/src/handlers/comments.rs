//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_shared::dto::CreateCommentRequest;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let comment = state.comments.add_comment(req).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/comments/post/{post_id}
pub async fn comments_for_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.comments_for_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}
