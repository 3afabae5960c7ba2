//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 书名校验与副本命名
//! - 章节字数统计
//! - 默认状态常量

mod errors;
mod value_objects;

pub use errors::BookError;
pub use value_objects::{
    count_words, BookTitle, DEFAULT_BOOK_STATUS, DEFAULT_CHAPTER_STATUS, MAX_TITLE_CHARS,
};
