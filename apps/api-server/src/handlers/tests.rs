use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use super::configure_routes;
use crate::middleware::error::problem_details;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .wrap(problem_details())
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(AppState::in_memory()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! post_json {
    ($app:expr, $uri:expr, $body:expr $(,)?) => {
        test::call_service(
            &$app,
            test::TestRequest::post().uri($uri).set_json($body).to_request(),
        )
    };
}

/// Status and decoded body of a GET; empty bodies decode to `Value::Null`.
macro_rules! get_json {
    ($app:expr, $uri:expr) => {
        async {
            let req = test::TestRequest::get().uri($uri).to_request();
            let res = test::call_service(&$app, req).await;
            let status = res.status();
            let body = test::read_body(res).await;
            let value: Value = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body).unwrap()
            };
            (status, value)
        }
    };
}

/// POST expecting 201 and return the created resource's id.
macro_rules! created_id {
    ($app:expr, $uri:expr, $body:expr $(,)?) => {
        async {
            let res = post_json!($app, $uri, $body).await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let value: Value = test::read_body_json(res).await;
            value["id"].as_str().unwrap().to_string()
        }
    };
}

#[actix_web::test]
async fn test_health_reports_in_memory_store() {
    let app = init_app!();

    let (status, body) = get_json!(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "in-memory");
}

#[actix_web::test]
async fn test_search_flow_over_http() {
    let app = init_app!();
    let alice = created_id!(
        app,
        "/api/users",
        json!({"name": "Alice", "email": "alice@example.com"}),
    )
    .await;
    let java = created_id!(app, "/api/categories", json!({"name": "Java"})).await;
    let python = created_id!(app, "/api/categories", json!({"name": "Python"})).await;
    for (title, category) in [
        ("Learn Java Loops", &java),
        ("Advanced Java Streams", &java),
        ("Python Basics", &python),
    ] {
        created_id!(
            app,
            &format!("/api/users/{alice}/posts"),
            json!({"title": title, "content": "Content", "categoryId": category}),
        )
        .await;
    }

    let (status, body) = get_json!(app, "/api/posts/search?keyword=java").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 2);
    assert_eq!(body["content"][0]["categoryName"], "Java");

    let (_, body) = get_json!(app, "/api/posts/search?category=Python").await;
    assert_eq!(body["content"][0]["title"], "Python Basics");

    let (_, body) = get_json!(app, "/api/posts/search?keyword=loops&category=Java").await;
    assert_eq!(body["totalElements"], 1);

    let (_, body) = get_json!(app, "/api/posts/search?keyword=&page=0&size=2").await;
    assert_eq!(body["totalElements"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["content"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_uncategorised_post_serializes_nulls() {
    let app = init_app!();
    let alice = created_id!(
        app,
        "/api/users",
        json!({"name": "Alice", "email": "alice@example.com"}),
    )
    .await;

    let res = post_json!(
        app,
        &format!("/api/users/{alice}/posts"),
        json!({"title": "Loose Notes", "content": "Content"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let (_, body) = get_json!(app, &format!("/api/users/{alice}/posts")).await;
    let post = &body["content"][0];
    assert!(post["categoryId"].is_null());
    assert!(post["categoryName"].is_null());
}

#[actix_web::test]
async fn test_invalid_user_is_unprocessable() {
    let app = init_app!();

    let res = post_json!(app, "/api/users", json!({"name": " ", "email": "nope"})).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 422);
    assert_eq!(body["title"], "Validation Failed");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request_with_request_id() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/users")
        .insert_header(("x-request-id", "req-123"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-123");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["requestId"], "req-123");
    assert_eq!(body["instance"], "/api/users");
}

#[actix_web::test]
async fn test_unknown_ids_are_not_found() {
    let app = init_app!();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = get_json!(app, &format!("/api/users/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, _) = get_json!(app, &format!("/api/posts/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json!(app, "/api/categories/by-name/Nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json!(app, "/api/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_service_errors_carry_path_and_request_id() {
    let app = init_app!();
    let path = format!("/api/users/{}", uuid::Uuid::new_v4());

    let req = test::TestRequest::get()
        .uri(&path)
        .insert_header(("x-request-id", "req-999"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-999");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["instance"], path.as_str());
    assert_eq!(body["requestId"], "req-999");
    assert!(body["detail"].as_str().unwrap().starts_with("User not found"));

    let user = json!({"name": "Alice", "email": "alice@example.com"});
    post_json!(app, "/api/users", user.clone()).await;
    let req = test::TestRequest::post()
        .uri("/api/users")
        .insert_header(("x-request-id", "req-1000"))
        .set_json(user)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["instance"], "/api/users");
    assert_eq!(body["requestId"], "req-1000");
}

#[actix_web::test]
async fn test_like_lifecycle() {
    let app = init_app!();
    let alice = created_id!(
        app,
        "/api/users",
        json!({"name": "Alice", "email": "alice@example.com"}),
    )
    .await;
    let post = created_id!(
        app,
        &format!("/api/users/{alice}/posts"),
        json!({"title": "Learn Java Loops", "content": "Content"}),
    )
    .await;
    let like = json!({"userId": alice, "postId": post});

    assert_eq!(post_json!(app, "/api/likes", like.clone()).await.status(), StatusCode::CREATED);
    assert_eq!(post_json!(app, "/api/likes", like).await.status(), StatusCode::CONFLICT);

    let (_, count) = get_json!(app, &format!("/api/likes/post/{post}/count")).await;
    assert_eq!(count, 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/likes/post/{post}/user/{alice}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let (_, count) = get_json!(app, &format!("/api/likes/post/{post}/count")).await;
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_comments_and_active_users_report() {
    let app = init_app!();
    let alice = created_id!(
        app,
        "/api/users",
        json!({"name": "Alice", "email": "alice@example.com"}),
    )
    .await;
    let bob = created_id!(
        app,
        "/api/users",
        json!({"name": "Bob", "email": "bob@example.com"}),
    )
    .await;
    let post = created_id!(
        app,
        &format!("/api/users/{alice}/posts"),
        json!({"title": "Learn Java Loops", "content": "Content"}),
    )
    .await;

    let res = post_json!(
        app,
        "/api/comments",
        json!({"text": "Great post", "userId": bob, "postId": post}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(res).await;
    assert_eq!(comment["userName"], "Bob");

    let (_, comments) = get_json!(app, &format!("/api/comments/post/{post}")).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (_, detail) = get_json!(app, &format!("/api/posts/{post}")).await;
    assert_eq!(detail["authorName"], "Alice");
    assert_eq!(detail["comments"][0]["text"], "Great post");

    let (_, report) = get_json!(app, "/api/reports/active-users").await;
    assert_eq!(report[0]["userName"], "Bob");
    assert_eq!(report[0]["activityCount"], 1);
}

#[actix_web::test]
async fn test_duplicate_email_conflicts() {
    let app = init_app!();
    let user = json!({"name": "Alice", "email": "alice@example.com"});

    assert_eq!(post_json!(app, "/api/users", user.clone()).await.status(), StatusCode::CREATED);
    let res = post_json!(app, "/api/users", user).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Email already registered");
}
