//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod book_commands;
mod timeline_commands;
mod world_commands;

pub mod handlers;

pub use book_commands::*;
pub use timeline_commands::*;
pub use world_commands::*;
