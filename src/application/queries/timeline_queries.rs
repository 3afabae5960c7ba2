//! Timeline Queries

use uuid::Uuid;

/// 按绝对刻度列出书中所有事件
#[derive(Debug, Clone)]
pub struct ListTimeline {
    pub book_id: Uuid,
}

/// 列出书中所有关系及其当前状态
#[derive(Debug, Clone)]
pub struct ListRelationships {
    pub book_id: Uuid,
}
