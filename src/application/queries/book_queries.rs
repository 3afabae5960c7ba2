//! Book Queries

use uuid::Uuid;

/// 获取书籍详情查询
#[derive(Debug, Clone)]
pub struct GetBook {
    pub book_id: Uuid,
}

/// 列出所有书籍查询
#[derive(Debug, Clone)]
pub struct ListBooks;

/// 构建全书快照查询
#[derive(Debug, Clone)]
pub struct BuildSnapshot {
    pub book_id: Uuid,
}

/// 渲染整书稿件（HTML）查询
#[derive(Debug, Clone)]
pub struct RenderManuscript {
    pub book_id: Uuid,
}
