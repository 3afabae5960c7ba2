//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod book_handlers;
mod restore_handlers;
mod timeline_handlers;
mod world_handlers;

pub use book_handlers::*;
pub use restore_handlers::*;
pub use timeline_handlers::*;
pub use world_handlers::{
    ChapterCreated, CreateChapterHandler, CreateEntityHandler, CreateEraHandler,
    CreateVolumeHandler, EntityCreated, EraCreated, VolumeCreated,
};
