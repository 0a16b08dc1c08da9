use std::sync::Arc;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Category, Comment, Post, PostLike, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostLikeRepository, PostRepository};
use quill_core::query::{has_category, title_contains};
use quill_core::scope::ReadScope;
use quill_core::service::{
    CategoryService, CommentService, PostLikeService, PostService, UserService,
};
use quill_shared::PageRequest;
use quill_shared::dto::{
    CreateCategoryRequest, CreateCommentRequest, CreatePostRequest, CreateUserRequest,
    LikeRequest, PostSearchParams,
};

use super::InMemoryStore;

struct Services {
    store: Arc<InMemoryStore>,
    users: UserService,
    posts: PostService,
    categories: CategoryService,
    comments: CommentService,
    likes: PostLikeService,
}

fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    Services {
        users: UserService::new(store.clone(), store.clone()),
        posts: PostService::new(store.clone(), store.clone(), store.clone()),
        categories: CategoryService::new(store.clone(), store.clone()),
        comments: CommentService::new(store.clone(), store.clone(), store.clone()),
        likes: PostLikeService::new(store.clone(), store.clone(), store.clone()),
        store,
    }
}

async fn seed_user(store: &InMemoryStore, name: &str) -> User {
    store
        .save(User::new(name.to_string(), format!("{}@example.com", name.to_lowercase())))
        .await
        .unwrap()
}

async fn seed_category(store: &InMemoryStore, name: &str) -> Category {
    store
        .save(Category::new(name.to_string(), None))
        .await
        .unwrap()
}

async fn seed_post(store: &InMemoryStore, author: &User, title: &str, category: Option<&Category>) -> Post {
    let mut post = Post::new(author.id, title.to_string(), "Content".to_string());
    if let Some(category) = category {
        post = post.with_category(category.id);
    }
    store.save(post).await.unwrap()
}

/// Alice with three posts: two under "Java", one under "Python".
async fn seed_catalogue(store: &InMemoryStore) -> User {
    let alice = seed_user(store, "Alice").await;
    let java = seed_category(store, "Java").await;
    let python = seed_category(store, "Python").await;
    seed_post(store, &alice, "Learn Java Loops", Some(&java)).await;
    seed_post(store, &alice, "Advanced Java Streams", Some(&java)).await;
    seed_post(store, &alice, "Python Basics", Some(&python)).await;
    alice
}

fn search(keyword: Option<&str>, category: Option<&str>) -> PostSearchParams {
    PostSearchParams {
        keyword: keyword.map(str::to_string),
        category: category.map(str::to_string),
    }
}

#[tokio::test]
async fn test_search_by_keyword_ignores_case() {
    let s = services();
    seed_catalogue(&s.store).await;

    let page = s
        .posts
        .search(&search(Some("java"), None), PageRequest::default())
        .await
        .unwrap();

    let titles: Vec<_> = page.content.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Learn Java Loops", "Advanced Java Streams"]);
    assert!(page.content.iter().all(|p| p.category_name.as_deref() == Some("Java")));
    assert_eq!(page.total_elements, 2);
}

#[tokio::test]
async fn test_search_by_exact_category() {
    let s = services();
    seed_catalogue(&s.store).await;

    let page = s
        .posts
        .search(&search(None, Some("Python")), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "Python Basics");

    let page = s
        .posts
        .search(&search(None, Some("python")), PageRequest::default())
        .await
        .unwrap();
    assert!(page.content.is_empty());
}

#[tokio::test]
async fn test_search_with_both_filters() {
    let s = services();
    seed_catalogue(&s.store).await;

    let page = s
        .posts
        .search(&search(Some("loops"), Some("Java")), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "Learn Java Loops");
}

#[tokio::test]
async fn test_search_keyword_wildcards_match_literally() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    seed_post(&s.store, &alice, "100% Rust", None).await;
    seed_post(&s.store, &alice, "100 Rust", None).await;
    seed_post(&s.store, &alice, "snake_case names", None).await;
    seed_post(&s.store, &alice, "snakeXcase names", None).await;

    let page = s
        .posts
        .search(&search(Some("0%"), None), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "100% Rust");

    let page = s
        .posts
        .search(&search(Some("E_C"), None), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "snake_case names");
}

#[tokio::test]
async fn test_search_without_filters_returns_everything() {
    let s = services();
    seed_catalogue(&s.store).await;

    let page = s
        .posts
        .search(&search(Some(""), None), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total_elements, 3);
}

#[tokio::test]
async fn test_uncategorised_post_maps_to_null_category() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    seed_post(&s.store, &alice, "Loose Notes", None).await;

    let page = s
        .posts
        .posts_by_user(alice.id, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].category_id, None);
    assert_eq!(page.content[0].category_name, None);

    let hits = s
        .posts
        .search(&search(None, Some("Java")), PageRequest::default())
        .await
        .unwrap();
    assert!(hits.content.is_empty());
}

#[tokio::test]
async fn test_posts_by_user_paginates() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    for i in 0..5 {
        seed_post(&s.store, &alice, &format!("Post {i}"), None).await;
    }

    let page = s
        .posts
        .posts_by_user(alice.id, PageRequest::new(1, 2))
        .await
        .unwrap();

    let titles: Vec<_> = page.content.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Post 2", "Post 3"]);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn test_posts_by_unknown_user_is_not_found() {
    let s = services();

    let result = s
        .posts
        .posts_by_user(Uuid::new_v4(), PageRequest::default())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "User", .. })
    ));
}

#[tokio::test]
async fn test_category_read_after_scope_closed_fails() {
    let s = services();
    seed_catalogue(&s.store).await;

    let scope = ReadScope::begin("test");
    let views = s
        .store
        .find_matching(&scope, &title_contains(Some("Python")))
        .await
        .unwrap();
    assert_eq!(views[0].category.get().unwrap().map(|c| c.name.as_str()), Some("Python"));
    scope.close();

    assert!(matches!(views[0].category.get(), Err(RepoError::DataAccess(_))));
}

#[tokio::test]
async fn test_find_matching_evaluates_composed_predicate() {
    let s = services();
    seed_catalogue(&s.store).await;

    let scope = ReadScope::begin("test");
    let predicate = has_category(Some("Python")).or(title_contains(Some("streams")));
    let views = s.store.find_matching(&scope, &predicate).await.unwrap();

    let titles: Vec<_> = views.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["Advanced Java Streams", "Python Basics"]);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let s = services();
    let request = CreateUserRequest {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    s.users.create_user(request.clone()).await.unwrap();

    let result = s.users.create_user(request).await;

    assert!(matches!(result, Err(DomainError::Duplicate(_))));
}

#[tokio::test]
async fn test_list_users_includes_their_posts() {
    let s = services();
    seed_catalogue(&s.store).await;
    seed_user(&s.store, "Bob").await;

    let users = s.users.list_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].posts.len(), 3);
    assert!(users[1].posts.is_empty());
    assert!(users[0].posts.iter().all(|p| p.category_name.is_none()));
}

#[tokio::test]
async fn test_create_post_fills_category_name() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let rust = seed_category(&s.store, "Rust").await;

    let dto = s
        .posts
        .create_post(
            alice.id,
            CreatePostRequest {
                title: "Ownership".to_string(),
                content: "Borrowing rules".to_string(),
                category_id: Some(rust.id),
            },
        )
        .await
        .unwrap();

    assert_eq!(dto.category_id, Some(rust.id));
    assert_eq!(dto.category_name.as_deref(), Some("Rust"));
}

#[tokio::test]
async fn test_create_post_with_unknown_category_is_not_found() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;

    let result = s
        .posts
        .create_post(
            alice.id,
            CreatePostRequest {
                title: "Ownership".to_string(),
                content: "Borrowing rules".to_string(),
                category_id: Some(Uuid::new_v4()),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "Category", .. })
    ));
}

#[tokio::test]
async fn test_blank_post_and_comment_text_are_rejected() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;

    let result = s
        .posts
        .create_post(
            alice.id,
            CreatePostRequest {
                title: "  ".to_string(),
                content: "Borrowing rules".to_string(),
                category_id: None,
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Validation(msg)) if msg == "Title must not be blank"));

    let post = seed_post(&s.store, &alice, "Ownership", None).await;
    let result = s
        .comments
        .add_comment(CreateCommentRequest {
            text: String::new(),
            user_id: alice.id,
            post_id: post.id,
        })
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let page = s
        .posts
        .posts_by_user(alice.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert!(s.comments.comments_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_detail_has_author_and_newest_comment_first() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let bob = seed_user(&s.store, "Bob").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", None).await;

    for text in ["first", "second"] {
        s.comments
            .add_comment(CreateCommentRequest {
                text: text.to_string(),
                user_id: bob.id,
                post_id: post.id,
            })
            .await
            .unwrap();
    }

    let detail = s.posts.get_post_detail(post.id).await.unwrap();

    assert_eq!(detail.author_name, "Alice");
    let texts: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["second", "first"]);
    assert!(detail.comments.iter().all(|c| c.user_name == "Bob"));
}

#[tokio::test]
async fn test_comment_on_unknown_post_is_not_found() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;

    let result = s
        .comments
        .add_comment(CreateCommentRequest {
            text: "hello".to_string(),
            user_id: alice.id,
            post_id: Uuid::new_v4(),
        })
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
}

#[tokio::test]
async fn test_second_like_is_duplicate() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", None).await;
    let like = LikeRequest {
        user_id: alice.id,
        post_id: post.id,
    };

    s.likes.like_post(like.clone()).await.unwrap();
    let again = s.likes.like_post(like).await;

    assert!(matches!(again, Err(DomainError::Duplicate(_))));
    assert_eq!(s.likes.count_likes(post.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unlike_missing_like_is_not_an_error() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", None).await;
    s.store.save(PostLike::new(alice.id, post.id)).await.unwrap();

    s.likes.unlike_post(alice.id, post.id).await.unwrap();
    s.likes.unlike_post(alice.id, post.id).await.unwrap();

    assert_eq!(s.likes.count_likes(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_top_active_users_counts_comments_and_likes() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let bob = seed_user(&s.store, "Bob").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", None).await;

    s.store
        .save(Comment::new("one".to_string(), bob.id, post.id))
        .await
        .unwrap();
    s.store
        .save(Comment::new("two".to_string(), bob.id, post.id))
        .await
        .unwrap();
    s.store.save(PostLike::new(bob.id, post.id)).await.unwrap();
    s.store.save(PostLike::new(alice.id, post.id)).await.unwrap();

    let report = s.likes.top_active_users().await.unwrap();

    assert_eq!(report[0].user_name, "Bob");
    assert_eq!(report[0].activity_count, 3);
    assert_eq!(report[1].user_name, "Alice");
    assert_eq!(report[1].activity_count, 1);
}

#[tokio::test]
async fn test_top_active_users_is_limited_to_five() {
    let s = services();
    for i in 0..7 {
        seed_user(&s.store, &format!("User{i}")).await;
    }

    let report = s.likes.top_active_users().await.unwrap();

    assert_eq!(report.len(), 5);
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let bob = seed_user(&s.store, "Bob").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", None).await;
    s.store
        .save(Comment::new("nice".to_string(), bob.id, post.id))
        .await
        .unwrap();
    s.store.save(PostLike::new(bob.id, post.id)).await.unwrap();

    s.users.delete_user(alice.id).await.unwrap();

    assert!(!BaseRepository::<Post, Uuid>::exists(&*s.store, post.id).await.unwrap());
    assert!(s.comments.comments_for_post(post.id).await.unwrap().is_empty());
    assert_eq!(s.store.count_by_post(post.id).await.unwrap(), 0);
    assert!(matches!(
        s.users.delete_user(alice.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_deleting_category_uncategorises_posts() {
    let s = services();
    let alice = seed_user(&s.store, "Alice").await;
    let java = seed_category(&s.store, "Java").await;
    let post = seed_post(&s.store, &alice, "Learn Java Loops", Some(&java)).await;

    BaseRepository::<Category, Uuid>::delete(&*s.store, java.id)
        .await
        .unwrap();

    let stored: Post = s.store.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.category_id, None);
}

#[tokio::test]
async fn test_category_lookups() {
    let s = services();
    let created = s
        .categories
        .create_category(CreateCategoryRequest {
            name: "Rust".to_string(),
            description: Some("Systems".to_string()),
        })
        .await
        .unwrap();

    let found = s.categories.find_by_name("Rust").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(s.categories.find_by_name("rust").await.unwrap().is_none());

    let duplicate = s
        .categories
        .create_category(CreateCategoryRequest {
            name: "Rust".to_string(),
            description: None,
        })
        .await;
    assert!(matches!(duplicate, Err(DomainError::Duplicate(_))));

    assert!(matches!(
        s.categories.posts_by_category(Uuid::new_v4()).await,
        Err(DomainError::NotFound { entity_type: "Category", .. })
    ));
}

#[tokio::test]
async fn test_store_rejects_duplicate_like_row() {
    let store = InMemoryStore::new();
    let alice = seed_user(&store, "Alice").await;
    let post = seed_post(&store, &alice, "Learn Java Loops", None).await;
    store.save(PostLike::new(alice.id, post.id)).await.unwrap();

    let result = store.save(PostLike::new(alice.id, post.id)).await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}
