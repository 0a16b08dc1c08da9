//! # Quill Shared
//!
//! Wire shapes shared by the API server and its clients: request bodies,
//! flat response DTOs, pagination and the error body.

pub mod dto;
pub mod pagination;
pub mod response;

pub use pagination::{Page, PageRequest};
pub use response::ErrorResponse;
