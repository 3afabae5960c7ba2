//! Repository Ports - 持久化记录与错误
//!
//! 记录类型是存储层的行模型；具体实现在 infrastructure 层（如 SQLite）

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Book / Volume / Chapter
// ============================================================================

/// 书籍（聚合根）
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub status: String,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 卷，`order_index` 在书内唯一
#[derive(Debug, Clone)]
pub struct VolumeRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub order_index: i64,
}

/// 章节，`order_index` 在卷内唯一
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub volume_id: Uuid,
    pub title: String,
    pub content: String,
    pub word_count: i64,
    pub status: String,
    pub order_index: i64,
}

// ============================================================================
// World building
// ============================================================================

/// 设定实体（人物 / 地点 / 道具）
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub attributes: serde_json::Value,
}

/// 纪元
#[derive(Debug, Clone)]
pub struct EraRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub start_absolute_tick: i64,
}

/// 时间线事件
///
/// 不变量: `absolute_tick = (era?.start_absolute_tick ?? 0) + year_in_era`
#[derive(Debug, Clone)]
pub struct TimelineEventRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub era_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub year_in_era: Option<i64>,
    pub month_in_era: Option<i64>,
    pub day_in_era: Option<i64>,
    pub absolute_tick: i64,
}

/// 事件参与者（事件 x 实体）
#[derive(Debug, Clone)]
pub struct EventParticipantRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub entity_id: Uuid,
    pub role: String,
}

/// 有向关系，每个有序实体对至多一条
#[derive(Debug, Clone)]
pub struct RelationshipRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
}

/// 关系快照：自 `start_tick` 起的关系状态，`start_tick` 最大者为当前状态
#[derive(Debug, Clone)]
pub struct RelationshipSnapshotRecord {
    pub id: Uuid,
    pub relationship_id: Uuid,
    pub start_tick: i64,
    pub relation_type: String,
    pub label: Option<String>,
}
