//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod post_like;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use post::Post;
pub use post_like::PostLike;
pub use user::User;
