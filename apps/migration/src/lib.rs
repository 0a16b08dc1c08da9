pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users_table;
mod m20261019_000002_create_categories_table;
mod m20261019_000003_create_posts_table;
mod m20261019_000004_create_comments_table;
mod m20261019_000005_create_post_likes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users_table::Migration),
            Box::new(m20261019_000002_create_categories_table::Migration),
            Box::new(m20261019_000003_create_posts_table::Migration),
            Box::new(m20261019_000004_create_comments_table::Migration),
            Box::new(m20261019_000005_create_post_likes_table::Migration),
        ]
    }
}
