//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DbBackend, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Statement,
};
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    CategoryRepository, CommentRepository, PostLikeRepository, PostRepository, UserRepository,
};
use quill_core::projection::{
    AuthorRef, CategorySummary, CommentView, PostGraph, PostView, UserActivity, UserSummary,
};
use quill_core::query::Predicate;
use quill_core::scope::{Lazy, ReadScope};
use quill_shared::{Page, PageRequest};

use super::condition;
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

pub type PostgresPostLikeRepository = PostgresBaseRepository<PostLikeEntity>;

const TOP_ACTIVE_USERS_SQL: &str = r#"
SELECT
    u.id AS user_id,
    u.name AS user_name,
    (COUNT(DISTINCT c.id) + COUNT(DISTINCT pl.id)) AS activity_count
FROM users u
LEFT JOIN comments c ON u.id = c.user_id
LEFT JOIN post_likes pl ON u.id = pl.user_id
GROUP BY u.id, u.name
ORDER BY activity_count DESC
LIMIT $1
"#;

#[derive(Debug, FromQueryResult)]
struct PostViewRow {
    id: Uuid,
    title: String,
    content: String,
    category_id: Option<Uuid>,
    category_name: Option<String>,
}

impl PostViewRow {
    fn into_view(self, scope: &ReadScope) -> PostView {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(CategorySummary { id, name }),
            _ => None,
        };
        PostView {
            id: self.id,
            title: self.title,
            content: self.content,
            category: Lazy::scoped(category, scope.handle()),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserSummaryRow {
    id: Uuid,
    name: String,
    email: String,
}

#[derive(Debug, FromQueryResult)]
struct CategorySummaryRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, FromQueryResult)]
struct UserActivityRow {
    user_id: Uuid,
    user_name: String,
    activity_count: i64,
}

/// Post id/title/content plus the category's id and name, left-joined.
pub(super) fn post_views() -> Select<PostEntity> {
    PostEntity::find()
        .select_only()
        .column(post::Column::Id)
        .column(post::Column::Title)
        .column(post::Column::Content)
        .column_as(category::Column::Id, "category_id")
        .column_as(category::Column::Name, "category_name")
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .order_by_asc(post::Column::CreatedAt)
        .order_by_asc(post::Column::Id)
}

async fn fetch_view_page(
    db: &DbConn,
    scope: &ReadScope,
    query: Select<PostEntity>,
    page: PageRequest,
) -> Result<Page<PostView>, RepoError> {
    let page = page.clamped();
    let paginator = query.into_model::<PostViewRow>().paginate(db, page.size);
    let total = paginator.num_items().await.map_err(map_db_err)?;
    let rows = paginator.fetch_page(page.page).await.map_err(map_db_err)?;

    let views = rows.into_iter().map(|row| row.into_view(scope)).collect();
    Ok(Page::new(views, page, total))
}

async fn fetch_views(
    db: &DbConn,
    scope: &ReadScope,
    query: Select<PostEntity>,
) -> Result<Vec<PostView>, RepoError> {
    let rows = query
        .into_model::<PostViewRow>()
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(rows.into_iter().map(|row| row.into_view(scope)).collect())
}

/// Comments on a post with their authors, newest first.
async fn comment_views(db: &DbConn, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
    let rows = CommentEntity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .find_also_related(UserEntity)
        .order_by_desc(comment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(map_db_err)?;

    rows.into_iter()
        .map(|(comment, author)| {
            let author = author.ok_or_else(|| {
                RepoError::Query(format!("comment {} has no author", comment.id))
            })?;
            Ok(CommentView {
                id: comment.id,
                text: comment.text,
                created_at: comment.created_at.into(),
                author: AuthorRef {
                    id: author.id,
                    name: author.name,
                },
                post_id: comment.post_id,
            })
        })
        .collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all_summaries(&self) -> Result<Vec<UserSummary>, RepoError> {
        let rows = UserEntity::find()
            .select_only()
            .columns([user::Column::Id, user::Column::Name, user::Column::Email])
            .order_by_asc(user::Column::CreatedAt)
            .into_model::<UserSummaryRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: row.id,
                name: row.name,
                email: row.email,
            })
            .collect())
    }

    async fn find_all_with_posts(&self) -> Result<Vec<(User, Vec<Post>)>, RepoError> {
        let rows = UserEntity::find()
            .find_with_related(PostEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(user, posts)| (user.into(), posts.into_iter().map(Into::into).collect()))
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_views_by_user(
        &self,
        scope: &ReadScope,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let query = post_views().filter(post::Column::UserId.eq(user_id));
        fetch_view_page(&self.db, scope, query, page).await
    }

    async fn find_views_by_category(
        &self,
        scope: &ReadScope,
        category_id: Uuid,
    ) -> Result<Vec<PostView>, RepoError> {
        let query = post_views().filter(post::Column::CategoryId.eq(category_id));
        fetch_views(&self.db, scope, query).await
    }

    async fn find_matching(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
    ) -> Result<Vec<PostView>, RepoError> {
        let query = condition::apply(post_views(), predicate);
        fetch_views(&self.db, scope, query).await
    }

    async fn search(
        &self,
        scope: &ReadScope,
        predicate: &Predicate,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let query = condition::apply(post_views(), predicate);
        fetch_view_page(&self.db, scope, query, page).await
    }

    async fn find_with_user_and_comments(&self, id: Uuid) -> Result<Option<PostGraph>, RepoError> {
        let Some((post, author)) = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };
        let author =
            author.ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
        let comments = comment_views(&self.db, id).await?;

        Ok(Some(PostGraph {
            post: post.into(),
            author: author.into(),
            comments,
        }))
    }

    async fn find_all_with_user(&self) -> Result<Vec<(Post, User)>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(post, author)| author.map(|author| (post.into(), author.into())))
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<CategorySummary>, RepoError> {
        let row = CategoryEntity::find()
            .select_only()
            .columns([category::Column::Id, category::Column::Name])
            .filter(category::Column::Name.eq(name))
            .into_model::<CategorySummaryRow>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(|row| CategorySummary {
            id: row.id,
            name: row.name,
        }))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_views_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        comment_views(&self.db, post_id).await
    }
}

#[async_trait]
impl PostLikeRepository for PostgresPostLikeRepository {
    async fn exists_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<bool, RepoError> {
        let count = PostLikeEntity::find()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn delete_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<u64, RepoError> {
        let result = PostLikeEntity::delete_many()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn top_active_users(&self, limit: u64) -> Result<Vec<UserActivity>, RepoError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = UserActivityRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            TOP_ACTIVE_USERS_SQL,
            [limit.into()],
        ))
        .all(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| UserActivity {
                user_id: row.user_id,
                user_name: row.user_name,
                activity_count: row.activity_count,
            })
            .collect())
    }
}
