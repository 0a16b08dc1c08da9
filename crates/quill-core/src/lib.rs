//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! Entities, the post query composer, read-only projections and their
//! mappers, the repository ports and the services built on them. No
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod mapping;
pub mod ports;
pub mod projection;
pub mod query;
pub mod scope;
pub mod service;

pub use error::{DomainError, RepoError};
