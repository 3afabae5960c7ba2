//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod book_handlers;
mod snapshot_handlers;
mod timeline_handlers;

pub use book_handlers::*;
pub use snapshot_handlers::*;
pub use timeline_handlers::*;
