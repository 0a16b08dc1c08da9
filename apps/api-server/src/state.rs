//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, CommentRepository, PostLikeRepository, PostRepository, UserRepository,
};
use quill_core::service::{
    CategoryService, CommentService, PostLikeService, PostService, UserService,
};
use quill_infra::InMemoryStore;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use sea_orm::{DbConn, DbErr};

#[cfg(feature = "postgres")]
use quill_infra::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostLikeRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Which record store the services are wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    InMemory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::InMemory => "in-memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<PostLikeService>,
    pub store: StoreKind,
}

/// One handle per repository port.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn PostLikeRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            categories: store.clone(),
            comments: store.clone(),
            likes: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: DbConn) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            likes: Arc::new(PostgresPostLikeRepository::new(db)),
        }
    }
}

impl AppState {
    /// Build the application state, falling back to the in-memory store
    /// when no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        match Self::with_database(config).await {
            Some(state) => state,
            None => Self::in_memory(),
        }
    }

    #[cfg(feature = "postgres")]
    async fn with_database(config: &AppConfig) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        match connect_and_migrate(db_config, config.run_migrations).await {
            Ok(db) => {
                tracing::info!("Application state initialized with postgres store");
                Some(Self::from_repositories(
                    Repositories::postgres(db),
                    StoreKind::Postgres,
                ))
            }
            Err(e) => {
                tracing::error!(
                    "Failed to prepare database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn with_database(_config: &AppConfig) -> Option<Self> {
        tracing::info!("Running without postgres feature - using in-memory store");
        None
    }

    /// State backed by a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::from_repositories(Repositories::in_memory(), StoreKind::InMemory)
    }

    fn from_repositories(repos: Repositories, store: StoreKind) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.users.clone(), repos.posts.clone())),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.users.clone(),
                repos.categories.clone(),
            )),
            categories: Arc::new(CategoryService::new(
                repos.categories.clone(),
                repos.posts.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.comments,
                repos.users.clone(),
                repos.posts.clone(),
            )),
            likes: Arc::new(PostLikeService::new(repos.likes, repos.users, repos.posts)),
            store,
        }
    }
}

#[cfg(feature = "postgres")]
async fn connect_and_migrate(
    db_config: &quill_infra::DatabaseConfig,
    run_migrations: bool,
) -> Result<DbConn, DbErr> {
    use migration::{Migrator, MigratorTrait};

    let db = quill_infra::connect(db_config).await?;
    if run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("Database migrations applied");
    }
    Ok(db)
}
