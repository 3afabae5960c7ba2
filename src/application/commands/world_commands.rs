//! World Commands - 卷、章节、实体、纪元

use uuid::Uuid;

/// 创建卷（排在最后）
#[derive(Debug, Clone)]
pub struct CreateVolume {
    pub book_id: Uuid,
    pub title: String,
}

/// 创建章节（排在卷内最后）
#[derive(Debug, Clone)]
pub struct CreateChapter {
    pub volume_id: Uuid,
    pub title: String,
    pub content: String,
}

/// 创建设定实体
#[derive(Debug, Clone)]
pub struct CreateEntity {
    pub book_id: Uuid,
    pub name: String,
    /// character / location / item
    pub kind: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

/// 创建纪元
#[derive(Debug, Clone)]
pub struct CreateEra {
    pub book_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// 起始刻度；为空时接在上一个纪元之后
    pub start_tick: Option<i64>,
}
