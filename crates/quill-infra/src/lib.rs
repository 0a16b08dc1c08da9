//! # Quill Infrastructure
//!
//! Concrete implementations of the repository ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL store via SeaORM
//! - `minimal` - No external dependencies, in-memory store only

pub mod database;
pub mod memory;

// Re-exports - In-Memory
pub use memory::InMemoryStore;

// Re-exports - Database
pub use database::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostLikeRepository,
    PostgresPostRepository, PostgresUserRepository, connect,
};
