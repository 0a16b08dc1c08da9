//! In-memory record store - used when no database is configured, and in tests.
//!
//! Implements every repository port over plain vectors behind an async
//! `RwLock`. Rows keep insertion order. Deletes cascade the same way the
//! database foreign keys do. Note: data is lost on process restart.

use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post, PostLike, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostLikeRepository, PostRepository,
    UserRepository,
};
use quill_core::projection::{
    AuthorRef, CategorySummary, CommentView, PostGraph, PostView, UserActivity, UserSummary,
};
use quill_core::query::{PostField, PostFields, Predicate};
use quill_core::scope::{Lazy, ReadScope};
use quill_shared::{Page, PageRequest};

#[cfg(test)]
mod tests;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    categories: Vec<Category>,
    comments: Vec<Comment>,
    likes: Vec<PostLike>,
}

impl Tables {
    fn category(&self, id: Option<Uuid>) -> Option<&Category> {
        let id = id?;
        self.categories.iter().find(|c| c.id == id)
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn post_view(&self, post: &Post, scope: &ReadScope) -> PostView {
        let category = self.category(post.category_id).map(|c| CategorySummary {
            id: c.id,
            name: c.name.clone(),
        });
        PostView {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            category: Lazy::scoped(category, scope.handle()),
        }
    }

    fn comment_views(&self, post_id: Uuid) -> Vec<CommentView> {
        let mut comments: Vec<&Comment> = self
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .collect();
        // Stable: equal timestamps keep newest-inserted first.
        comments.sort_by_key(|c| Reverse(c.created_at));

        comments
            .into_iter()
            .filter_map(|c| {
                let author = self.user(c.user_id)?;
                Some(CommentView {
                    id: c.id,
                    text: c.text.clone(),
                    created_at: c.created_at,
                    author: AuthorRef {
                        id: author.id,
                        name: author.name.clone(),
                    },
                    post_id: c.post_id,
                })
            })
            .collect()
    }

    fn matching_posts<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a Post> {
        self.posts.iter().filter(move |post| {
            predicate.matches(&PostRow {
                post,
                category: self.category(post.category_id),
            })
        })
    }
}

/// A post joined with its category, as the predicate interpreter sees it.
struct PostRow<'a> {
    post: &'a Post,
    category: Option<&'a Category>,
}

impl PostFields for PostRow<'_> {
    fn field(&self, field: PostField) -> Option<&str> {
        match field {
            PostField::Title => Some(&self.post.title),
            PostField::Content => Some(&self.post.content),
            PostField::CategoryName => self.category.map(|c| c.name.as_str()),
        }
    }
}

/// Table bookkeeping shared by the [`BaseRepository`] impls.
trait Record: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn id(&self) -> Uuid;
    fn rows(tables: &Tables) -> &Vec<Self>;
    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// Reject rows that would break a unique or foreign key constraint.
    fn check_constraints(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Apply the cascade rules for a deleted row.
    fn on_delete(_id: Uuid, _tables: &mut Tables) {}
}

impl Record for User {
    const NAME: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.users
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables.users.iter().any(|u| u.email == self.email) {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        let owned: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            Post::on_delete(post_id, tables);
        }
        tables.posts.retain(|p| p.user_id != id);
        tables.comments.retain(|c| c.user_id != id);
        tables.likes.retain(|l| l.user_id != id);
    }
}

impl Record for Post {
    const NAME: &'static str = "posts";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.posts
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables.user(self.user_id).is_none() {
            return Err(RepoError::Constraint(
                "posts.user_id references a missing user".to_string(),
            ));
        }
        if self.category_id.is_some() && tables.category(self.category_id).is_none() {
            return Err(RepoError::Constraint(
                "posts.category_id references a missing category".to_string(),
            ));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        tables.comments.retain(|c| c.post_id != id);
        tables.likes.retain(|l| l.post_id != id);
    }
}

impl Record for Category {
    const NAME: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.categories
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables.categories.iter().any(|c| c.name == self.name) {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"categories_name_key\""
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        for post in tables.posts.iter_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Record for Comment {
    const NAME: &'static str = "comments";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.comments
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.comments
    }
}

impl Record for PostLike {
    const NAME: &'static str = "post_likes";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.likes
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.likes
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .likes
            .iter()
            .any(|l| l.user_id == self.user_id && l.post_id == self.post_id)
        {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"post_likes_user_post_key\""
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// In-memory store implementing every repository port.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    async fn find_row<T: Record>(&self, id: Uuid) -> Option<T> {
        let tables = self.tables.read().await;
        T::rows(&tables).iter().find(|r| r.id() == id).cloned()
    }

    async fn all_rows<T: Record>(&self) -> Vec<T> {
        let tables = self.tables.read().await;
        T::rows(&tables).clone()
    }

    async fn has_row<T: Record>(&self, id: Uuid) -> bool {
        let tables = self.tables.read().await;
        T::rows(&tables).iter().any(|r| r.id() == id)
    }

    async fn insert_row<T: Record>(&self, row: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::rows(&tables).iter().any(|r| r.id() == row.id()) {
            return Err(RepoError::Constraint(format!(
                "duplicate primary key in {}",
                T::NAME
            )));
        }
        row.check_constraints(&tables)?;
        T::rows_mut(&mut tables).push(row.clone());
        Ok(row)
    }

    async fn delete_row<T: Record>(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let rows = T::rows_mut(&mut tables);
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        T::on_delete(id, &mut tables);
        Ok(())
    }
}

macro_rules! impl_base_repository {
    ($($entity:ty),+ $(,)?) => {$(
        #[async_trait]
        impl BaseRepository<$entity, Uuid> for InMemoryStore {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, RepoError> {
                Ok(self.find_row(id).await)
            }

            async fn find_all(&self) -> Result<Vec<$entity>, RepoError> {
                Ok(self.all_rows().await)
            }

            async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
                Ok(self.has_row::<$entity>(id).await)
            }

            async fn save(&self, entity: $entity) -> Result<$entity, RepoError> {
                self.insert_row(entity).await
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                self.delete_row::<$entity>(id).await
            }
        }
    )+};
}

impl_base_repository!(User, Post, Category, Comment, PostLike);

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_all_summaries(&self) -> Result<Vec<UserSummary>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect())
    }

    async fn find_all_with_posts(&self) -> Result<Vec<(User, Vec<Post>)>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .map(|u| {
                let posts = tables
                    .posts
                    .iter()
                    .filter(|p| p.user_id == u.id)
                    .cloned()
                    .collect();
                (u.clone(), posts)
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_views_by_user(
        &self,
        scope: &ReadScope,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;
        let owned: Vec<&Post> = tables.posts.iter().filter(|p| p.user_id == user_id).collect();
        Ok(paginate(&tables, scope, owned, page))
    }

    async fn find_views_by_category(
        &self,
        scope: &ReadScope,
        category_id: Uuid,
    ) -> Result<Vec<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.category_id == Some(category_id))
            .map(|p| tables.post_view(p, scope))
            .collect())
    }

    async fn find_matching(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
    ) -> Result<Vec<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matching_posts(predicate)
            .map(|p| tables.post_view(p, scope))
            .collect())
    }

    async fn search(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;
        let matched: Vec<&Post> = tables.matching_posts(predicate).collect();
        Ok(paginate(&tables, scope, matched, page))
    }

    async fn find_with_user_and_comments(&self, id: Uuid) -> Result<Option<PostGraph>, RepoError> {
        let tables = self.tables.read().await;
        let Some(post) = tables.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        let author = tables
            .user(post.user_id)
            .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;

        Ok(Some(PostGraph {
            post: post.clone(),
            author: author.clone(),
            comments: tables.comment_views(id),
        }))
    }

    async fn find_all_with_user(&self) -> Result<Vec<(Post, User)>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter_map(|p| tables.user(p.user_id).map(|u| (p.clone(), u.clone())))
            .collect())
    }
}

fn paginate(
    tables: &Tables,
    scope: &ReadScope,
    posts: Vec<&Post>,
    page: PageRequest,
) -> Page<PostView> {
    let page = page.clamped();
    let total = posts.len() as u64;
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.size).unwrap_or(usize::MAX);
    let views = posts
        .into_iter()
        .skip(skip)
        .take(take)
        .map(|p| tables.post_view(p, scope))
        .collect();
    Page::new(views, page, total)
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CategorySummary>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name.clone(),
            }))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_views_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comment_views(post_id))
    }
}

#[async_trait]
impl PostLikeRepository for InMemoryStore {
    async fn exists_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.post_id == post_id))
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.likes.iter().filter(|l| l.post_id == post_id).count() as u64)
    }

    async fn delete_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok((before - tables.likes.len()) as u64)
    }

    async fn top_active_users(&self, limit: u64) -> Result<Vec<UserActivity>, RepoError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<UserActivity> = tables
            .users
            .iter()
            .map(|u| {
                let comments = tables.comments.iter().filter(|c| c.user_id == u.id).count();
                let likes = tables.likes.iter().filter(|l| l.user_id == u.id).count();
                UserActivity {
                    user_id: u.id,
                    user_name: u.name.clone(),
                    activity_count: (comments + likes) as i64,
                }
            })
            .collect();
        rows.sort_by_key(|r| Reverse(r.activity_count));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}
