//! Snapshot Context - 快照格式
//!
//! 快照是一本书完整对象图的自包含序列化。内部的交叉引用（事件 -> 纪元、
//! 参与者/关系 -> 实体）以原始 ID 作为链接键，必须能在同一快照内解析。

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::tick_format;
use super::{RemapCategory, SnapshotError};
use crate::domain::book::{DEFAULT_BOOK_STATUS, DEFAULT_CHAPTER_STATUS};

fn default_book_status() -> String {
    DEFAULT_BOOK_STATUS.to_string()
}

fn default_chapter_status() -> String {
    DEFAULT_CHAPTER_STATUS.to_string()
}

fn default_attributes() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

// 可空列导出时写成显式 `null`，与缺省字段同样回落到默认值

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn book_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_book_status))
}

fn chapter_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_chapter_status))
}

/// 实体属性只接受 JSON 对象，其余（含 `null`）视为空对象
fn object_or_empty<'de, D>(deserializer: D) -> Result<serde_json::Value, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Object(_) => Ok(value),
        _ => Ok(default_attributes()),
    }
}

/// 全书快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_book_status", deserialize_with = "book_status")]
    pub status: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volumes: Vec<SnapshotVolume>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<SnapshotEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub eras: Vec<SnapshotEra>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline_events: Vec<SnapshotEvent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<SnapshotRelationship>,
}

/// 卷（含有序章节）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVolume {
    pub title: String,
    pub order_index: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<SnapshotChapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotChapter {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub word_count: i64,
    #[serde(default = "default_chapter_status", deserialize_with = "chapter_status")]
    pub status: String,
    pub order_index: i64,
}

/// 设定实体（人物 / 地点 / 道具）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_attributes", deserialize_with = "object_or_empty")]
    pub attributes: serde_json::Value,
}

/// 纪元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEra {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order_index: i64,
    #[serde(deserialize_with = "tick_format::deserialize")]
    pub start_absolute_tick: i64,
}

/// 时间线事件
///
/// `absolute_tick` 仅作记录；恢复时总是根据新纪元重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub era_id: Option<String>,
    #[serde(default)]
    pub year_in_era: Option<i64>,
    #[serde(default)]
    pub month_in_era: Option<i64>,
    #[serde(default)]
    pub day_in_era: Option<i64>,
    #[serde(default, deserialize_with = "tick_format::deserialize")]
    pub absolute_tick: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_participants: Vec<SnapshotParticipant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParticipant {
    pub entity_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
}

/// 有向关系 (entity_a -> entity_b)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRelationship {
    pub entity_a_id: String,
    pub entity_b_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship_snapshots: Vec<SnapshotRelationState>,
}

/// 关系在某一刻度起的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRelationState {
    #[serde(deserialize_with = "tick_format::deserialize")]
    pub start_tick: i64,
    pub relation_type: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// 快照内无法解析的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    EventEra { event_id: String, era_id: String },
    Participant { event_id: String, entity_id: String },
    RelationshipEndpoint { entity_id: String },
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DanglingReference::EventEra { event_id, era_id } => {
                write!(f, "event {} -> era {}", event_id, era_id)
            }
            DanglingReference::Participant {
                event_id,
                entity_id,
            } => write!(f, "event {} -> participant {}", event_id, entity_id),
            DanglingReference::RelationshipEndpoint { entity_id } => {
                write!(f, "relationship -> entity {}", entity_id)
            }
        }
    }
}

fn require(value: &str, field: impl FnOnce() -> String) -> Result<(), SnapshotError> {
    if value.trim().is_empty() {
        return Err(SnapshotError::MissingField(field()));
    }
    Ok(())
}

impl BookSnapshot {
    /// 从 JSON 字节解析快照
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// 序列化为带缩进的 JSON
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 写入前的结构校验
    ///
    /// 检查必填标量、卷/章排序号唯一、实体与纪元的原始 ID 唯一。
    /// 交叉引用是否悬空不在这里判断，由恢复流程按各自策略处理。
    pub fn validate(&self) -> Result<(), SnapshotError> {
        require(&self.title, || "title".to_string())?;

        let mut volume_orders = HashSet::new();
        for volume in &self.volumes {
            require(&volume.title, || "volumes[].title".to_string())?;
            if !volume_orders.insert(volume.order_index) {
                return Err(SnapshotError::DuplicateOrderIndex {
                    scope: "volumes".to_string(),
                    order_index: volume.order_index,
                });
            }

            let mut chapter_orders = HashSet::new();
            for chapter in &volume.chapters {
                require(&chapter.title, || {
                    format!("volumes[{}].chapters[].title", volume.title)
                })?;
                if chapter.word_count < 0 {
                    return Err(SnapshotError::NegativeWordCount(chapter.title.clone()));
                }
                if !chapter_orders.insert(chapter.order_index) {
                    return Err(SnapshotError::DuplicateOrderIndex {
                        scope: format!("chapters of volume {}", volume.title),
                        order_index: chapter.order_index,
                    });
                }
            }
        }

        let mut entity_ids = HashSet::new();
        for entity in &self.entities {
            require(&entity.id, || "entities[].id".to_string())?;
            require(&entity.name, || format!("entities[{}].name", entity.id))?;
            if !entity_ids.insert(entity.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    category: RemapCategory::Entity,
                    id: entity.id.clone(),
                });
            }
        }

        let mut era_ids = HashSet::new();
        for era in &self.eras {
            require(&era.id, || "eras[].id".to_string())?;
            require(&era.name, || format!("eras[{}].name", era.id))?;
            if !era_ids.insert(era.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    category: RemapCategory::Era,
                    id: era.id.clone(),
                });
            }
        }

        for event in &self.timeline_events {
            require(&event.title, || format!("timeline_events[{}].title", event.id))?;
        }

        for relationship in &self.relationships {
            for state in &relationship.relationship_snapshots {
                require(&state.relation_type, || {
                    "relationships[].relationship_snapshots[].relation_type".to_string()
                })?;
            }
        }

        Ok(())
    }

    /// 列出所有无法在快照内解析的交叉引用；闭合的快照返回空列表
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let entity_ids: HashSet<&str> = self.entities.iter().map(|e| e.id.as_str()).collect();
        let era_ids: HashSet<&str> = self.eras.iter().map(|e| e.id.as_str()).collect();
        let mut dangling = Vec::new();

        for event in &self.timeline_events {
            if let Some(era_id) = &event.era_id {
                if !era_ids.contains(era_id.as_str()) {
                    dangling.push(DanglingReference::EventEra {
                        event_id: event.id.clone(),
                        era_id: era_id.clone(),
                    });
                }
            }
            for participant in &event.event_participants {
                if !entity_ids.contains(participant.entity_id.as_str()) {
                    dangling.push(DanglingReference::Participant {
                        event_id: event.id.clone(),
                        entity_id: participant.entity_id.clone(),
                    });
                }
            }
        }

        for relationship in &self.relationships {
            for endpoint in [&relationship.entity_a_id, &relationship.entity_b_id] {
                if !entity_ids.contains(endpoint.as_str()) {
                    dangling.push(DanglingReference::RelationshipEndpoint {
                        entity_id: endpoint.clone(),
                    });
                }
            }
        }

        dangling
    }

    pub fn chapter_count(&self) -> usize {
        self.volumes.iter().map(|v| v.chapters.len()).sum()
    }
}
