//! Category handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_shared::dto::CreateCategoryRequest;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/categories
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let category = state.categories.create_category(req).await?;
    Ok(HttpResponse::Created().json(category))
}

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.categories.list_categories().await?))
}

/// GET /api/categories/by-name/{name}
pub async fn find_by_name(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let category = state
        .categories
        .find_by_name(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category not found with name: {}", name)))?;
    Ok(HttpResponse::Ok().json(category))
}

/// GET /api/categories/{id}/posts
pub async fn posts_by_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.categories.posts_by_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
