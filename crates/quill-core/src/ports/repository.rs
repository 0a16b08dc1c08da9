use async_trait::async_trait;
use uuid::Uuid;

use quill_shared::{Page, PageRequest};

use crate::domain::{Category, Comment, Post, PostLike, User};
use crate::error::RepoError;
use crate::projection::{CategorySummary, CommentView, PostGraph, PostView, UserActivity, UserSummary};
use crate::query::Predicate;
use crate::scope::ReadScope;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    async fn exists(&self, id: ID) -> Result<bool, RepoError>;

    /// Persist a new entity and return it as stored.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Id, name and email of every user, without loading anything else.
    async fn find_all_summaries(&self) -> Result<Vec<UserSummary>, RepoError>;

    /// Every user with their posts, loaded in one batch.
    async fn find_all_with_posts(&self) -> Result<Vec<(User, Vec<Post>)>, RepoError>;
}

/// Post repository. Projection-producing methods bind lazily resolved
/// relationships to the given read scope.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn find_views_by_user(
        &self,
        scope: &ReadScope,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError>;

    async fn find_views_by_category(
        &self,
        scope: &ReadScope,
        category_id: Uuid,
    ) -> Result<Vec<PostView>, RepoError>;

    /// Evaluate a composed predicate over all posts.
    async fn find_matching(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
    ) -> Result<Vec<PostView>, RepoError>;

    /// Paginated [`PostRepository::find_matching`].
    async fn search(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError>;

    /// A post with its author and comments fetched together.
    async fn find_with_user_and_comments(&self, id: Uuid) -> Result<Option<PostGraph>, RepoError>;

    /// Every post joined with its author in a single query.
    async fn find_all_with_user(&self) -> Result<Vec<(Post, User)>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_name(&self, name: &str) -> Result<Option<CategorySummary>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, newest first, with their authors joined.
    async fn find_views_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;
}

#[async_trait]
pub trait PostLikeRepository: BaseRepository<PostLike, Uuid> {
    async fn exists_by_user_and_post(&self, user_id: Uuid, post_id: Uuid)
    -> Result<bool, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    /// Returns the number of likes removed (0 or 1).
    async fn delete_by_user_and_post(&self, user_id: Uuid, post_id: Uuid)
    -> Result<u64, RepoError>;

    /// Users ranked by comments plus likes, most active first.
    async fn top_active_users(&self, limit: u64) -> Result<Vec<UserActivity>, RepoError>;
}
