//! Timeline Command Handlers - 事件与关系

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::world_handlers::{ensure_book, require_name};
use crate::application::commands::{CreateRelationship, CreateTimelineEvent, UpdateTimelineEvent};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookStorePort, BookUnitOfWork, EventParticipantRecord, RelationshipRecord,
    RelationshipSnapshotRecord, TimelineEventRecord,
};
use crate::domain::timeline::resolve_absolute_tick;

/// 事件参与者的默认角色
pub const DEFAULT_PARTICIPANT_ROLE: &str = "participant";

/// 查找同一本书中的纪元，返回其起始刻度
async fn era_start(
    uow: &mut dyn BookUnitOfWork,
    book_id: Uuid,
    era_id: Option<Uuid>,
) -> Result<Option<i64>, ApplicationError> {
    let Some(era_id) = era_id else {
        return Ok(None);
    };
    match uow.find_era(era_id).await? {
        Some(era) if era.book_id == book_id => Ok(Some(era.start_absolute_tick)),
        _ => Err(ApplicationError::not_found("Era", era_id)),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEventSaved {
    pub id: Uuid,
    pub era_id: Option<Uuid>,
    pub title: String,
    pub year_in_era: Option<i64>,
    pub absolute_tick: i64,
    pub participants: usize,
}

impl TimelineEventSaved {
    fn new(event: TimelineEventRecord, participants: usize) -> Self {
        Self {
            id: event.id,
            era_id: event.era_id,
            title: event.title,
            year_in_era: event.year_in_era,
            absolute_tick: event.absolute_tick,
            participants,
        }
    }
}

// ============================================================================
// CreateTimelineEvent
// ============================================================================

/// CreateTimelineEvent Handler
pub struct CreateTimelineEventHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateTimelineEventHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: CreateTimelineEvent,
    ) -> Result<TimelineEventSaved, ApplicationError> {
        let title = require_name(&command.title, "事件标题")?;

        let mut uow = self.store.begin().await?;
        ensure_book(uow.as_mut(), command.book_id).await?;

        let start = era_start(uow.as_mut(), command.book_id, command.era_id).await?;
        let event = TimelineEventRecord {
            id: Uuid::new_v4(),
            book_id: command.book_id,
            era_id: command.era_id,
            title,
            description: command.description,
            year_in_era: command.year,
            month_in_era: command.month,
            day_in_era: command.day,
            absolute_tick: resolve_absolute_tick(start, command.year),
        };
        uow.insert_timeline_event(&event).await?;

        let mut seen = HashSet::new();
        let mut participant_ids = command.participant_ids;
        participant_ids.retain(|id| seen.insert(*id));
        for entity_id in &participant_ids {
            match uow.find_entity(*entity_id).await? {
                Some(entity) if entity.book_id == command.book_id => {}
                _ => return Err(ApplicationError::not_found("Entity", *entity_id)),
            }
            uow.insert_participant(&EventParticipantRecord {
                id: Uuid::new_v4(),
                event_id: event.id,
                entity_id: *entity_id,
                role: DEFAULT_PARTICIPANT_ROLE.to_string(),
            })
            .await?;
        }

        uow.commit().await?;

        tracing::info!(
            book_id = %event.book_id,
            event_id = %event.id,
            absolute_tick = event.absolute_tick,
            participants = participant_ids.len(),
            "Timeline event created"
        );

        Ok(TimelineEventSaved::new(event, participant_ids.len()))
    }
}

// ============================================================================
// UpdateTimelineEvent
// ============================================================================

/// UpdateTimelineEvent Handler
///
/// 纪元或年份变化后重新计算绝对刻度；其余字段按需覆盖
pub struct UpdateTimelineEventHandler {
    store: Arc<dyn BookStorePort>,
}

impl UpdateTimelineEventHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: UpdateTimelineEvent,
    ) -> Result<TimelineEventSaved, ApplicationError> {
        let mut uow = self.store.begin().await?;
        let mut event = uow
            .find_timeline_event(command.event_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("TimelineEvent", command.event_id))?;

        if let Some(title) = command.title {
            event.title = require_name(&title, "事件标题")?;
        }
        if let Some(description) = command.description {
            event.description = Some(description);
        }
        if let Some(era_id) = command.era_id {
            event.era_id = era_id;
        }
        if let Some(year) = command.year {
            event.year_in_era = Some(year);
        }

        let start = era_start(uow.as_mut(), event.book_id, event.era_id).await?;
        event.absolute_tick = resolve_absolute_tick(start, event.year_in_era);

        uow.update_timeline_event(&event).await?;
        let participants = uow.find_participants(event.id).await?.len();
        uow.commit().await?;

        tracing::info!(
            event_id = %event.id,
            absolute_tick = event.absolute_tick,
            "Timeline event updated"
        );

        Ok(TimelineEventSaved::new(event, participants))
    }
}

// ============================================================================
// CreateRelationship
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipSaved {
    pub relationship_id: Uuid,
    pub snapshot_id: Uuid,
    /// 是否新建了关系（否则只是追加状态）
    pub created: bool,
}

/// CreateRelationship Handler
///
/// 同一有序实体对只有一条关系：先查后插，再追加一条关系状态
pub struct CreateRelationshipHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateRelationshipHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: CreateRelationship,
    ) -> Result<RelationshipSaved, ApplicationError> {
        let relation_type = require_name(&command.relation_type, "关系类型")?;

        let mut uow = self.store.begin().await?;
        ensure_book(uow.as_mut(), command.book_id).await?;

        for entity_id in [command.source_id, command.target_id] {
            match uow.find_entity(entity_id).await? {
                Some(entity) if entity.book_id == command.book_id => {}
                _ => return Err(ApplicationError::not_found("Entity", entity_id)),
            }
        }

        let existing = uow
            .find_relationship_by_pair(command.book_id, command.source_id, command.target_id)
            .await?;
        let created = existing.is_none();
        let relationship_id = match existing {
            Some(relationship) => relationship.id,
            None => {
                let relationship = RelationshipRecord {
                    id: Uuid::new_v4(),
                    book_id: command.book_id,
                    source_id: command.source_id,
                    target_id: command.target_id,
                };
                uow.insert_relationship(&relationship).await?;
                relationship.id
            }
        };

        let snapshot = RelationshipSnapshotRecord {
            id: Uuid::new_v4(),
            relationship_id,
            start_tick: command.start_tick.unwrap_or(0),
            label: Some(command.label.unwrap_or_else(|| relation_type.clone())),
            relation_type,
        };
        uow.insert_relationship_snapshot(&snapshot).await?;
        uow.commit().await?;

        tracing::info!(
            book_id = %command.book_id,
            relationship_id = %relationship_id,
            created,
            "Relationship state recorded"
        );

        Ok(RelationshipSaved {
            relationship_id,
            snapshot_id: snapshot.id,
            created,
        })
    }
}
