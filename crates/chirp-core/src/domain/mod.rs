//! Domain entities - the core business objects.

mod page;
mod post;

pub use page::{
    DEFAULT_PAGE_SIZE, PageCursor, PageRequest, PageToken, PaginationError, PostPage,
};
pub use post::{AuthorId, NewPost, Post, PostId};
