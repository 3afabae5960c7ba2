//! SQLite Persistence - SQLite 数据库持久化实现

mod book_store;
mod database;

pub use book_store::*;
pub use database::*;
