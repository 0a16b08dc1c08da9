//! HTTP handlers and route configuration.

mod categories;
mod comments;
mod health;
mod likes;
mod posts;
mod reports;
mod users;

use actix_web::{
    HttpRequest, HttpResponse, ResponseError, error::InternalError, http::StatusCode, web,
};
use quill_shared::ErrorResponse;

use crate::middleware::error::with_request_context;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        reject_input(err, req, "Malformed request body")
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        reject_input(err, req, "Invalid path parameter")
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, req| {
        reject_input(err, req, "Invalid query parameter")
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::create_user))
                    .route("", web::get().to(users::list_users))
                    .route("/summaries", web::get().to(users::list_summaries))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::delete().to(users::delete_user))
                    .route("/{user_id}/posts", web::post().to(posts::create_post))
                    .route("/{user_id}/posts", web::get().to(posts::posts_by_user)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_with_authors))
                    .route("/search", web::get().to(posts::search))
                    .route("/{id}", web::get().to(posts::get_post)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::post().to(categories::create_category))
                    .route("", web::get().to(categories::list_categories))
                    .route("/by-name/{name}", web::get().to(categories::find_by_name))
                    .route("/{id}/posts", web::get().to(categories::posts_by_category)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::post().to(comments::add_comment))
                    .route("/post/{post_id}", web::get().to(comments::comments_for_post)),
            )
            .service(
                web::scope("/likes")
                    .route("", web::post().to(likes::like_post))
                    .route(
                        "/post/{post_id}/user/{user_id}",
                        web::delete().to(likes::unlike_post),
                    )
                    .route("/post/{post_id}/count", web::get().to(likes::count_likes)),
            )
            .service(
                web::scope("/reports")
                    .route("/active-users", web::get().to(reports::active_users)),
            ),
    )
    .default_service(web::to(not_found));
}

/// 400 with a problem body for input actix could not extract.
fn reject_input<E: ResponseError + 'static>(
    err: E,
    req: &HttpRequest,
    title: &str,
) -> actix_web::Error {
    let body = with_request_context(req, ErrorResponse::bad_request(err.to_string()));
    tracing::debug!(error = %err, "{}", title);
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    let body = with_request_context(
        &req,
        ErrorResponse::not_found(format!("No route for {} {}", req.method(), req.path())),
    );
    HttpResponse::build(StatusCode::NOT_FOUND).json(body)
}

#[cfg(test)]
mod tests;
