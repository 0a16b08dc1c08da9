//! Reporting handlers.

use actix_web::{HttpResponse, web};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/reports/active-users
///
/// Users ranked by comments plus likes, most active first.
pub async fn active_users(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.likes.top_active_users().await?))
}
