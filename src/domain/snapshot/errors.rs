//! Snapshot Context - Errors

use thiserror::Error;

use super::RemapCategory;

/// 快照结构错误，全部在写入开始前检出
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("快照解析失败: {0}")]
    Parse(String),

    #[error("缺少必填字段: {0}")]
    MissingField(String),

    #[error("{category} 存在重复的 ID: {id}")]
    DuplicateId { category: RemapCategory, id: String },

    #[error("重复的排序号 {order_index}: {scope}")]
    DuplicateOrderIndex { scope: String, order_index: i64 },

    #[error("章节字数不能为负: {0}")]
    NegativeWordCount(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Parse(err.to_string())
    }
}
