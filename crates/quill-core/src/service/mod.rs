//! Application services - one per aggregate, each wired with the
//! repositories it needs.

mod category;
mod comment;
mod like;
mod post;
mod user;

pub use category::CategoryService;
pub use comment::CommentService;
pub use like::{PostLikeService, TOP_ACTIVE_USERS_LIMIT};
pub use post::PostService;
pub use user::UserService;
