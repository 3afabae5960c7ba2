//! Timeline Commands - 事件与关系

use uuid::Uuid;

/// 创建时间线事件
#[derive(Debug, Clone)]
pub struct CreateTimelineEvent {
    pub book_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub era_id: Option<Uuid>,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    /// 参与者实体 ID（角色统一为 participant）
    pub participant_ids: Vec<Uuid>,
}

/// 更新时间线事件
///
/// `era_id`: `None` 不修改，`Some(None)` 解除纪元，`Some(Some(id))` 改为指定纪元
#[derive(Debug, Clone, Default)]
pub struct UpdateTimelineEvent {
    pub event_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub era_id: Option<Option<Uuid>>,
    pub year: Option<i64>,
}

/// 创建关系（同一有序实体对只保留一条关系，重复创建时追加关系快照）
#[derive(Debug, Clone)]
pub struct CreateRelationship {
    pub book_id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub relation_type: String,
    pub label: Option<String>,
    pub start_tick: Option<i64>,
}
