//! Timeline Query Handlers

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{BookStorePort, RelationshipSnapshotRecord};
use crate::application::queries::{ListRelationships, ListTimeline};

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantView {
    pub entity_id: Uuid,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEventView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub era_id: Option<Uuid>,
    pub era_name: Option<String>,
    pub year_in_era: Option<i64>,
    pub month_in_era: Option<i64>,
    pub day_in_era: Option<i64>,
    pub absolute_tick: i64,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationStateView {
    pub start_tick: i64,
    pub relation_type: String,
    pub label: Option<String>,
}

impl From<RelationshipSnapshotRecord> for RelationStateView {
    fn from(record: RelationshipSnapshotRecord) -> Self {
        Self {
            start_tick: record.start_tick,
            relation_type: record.relation_type,
            label: record.label,
        }
    }
}

/// 关系及其状态历史；`current` 为起始刻度最大的状态
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipView {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_name: String,
    pub target_id: Uuid,
    pub target_name: String,
    pub current: Option<RelationStateView>,
    pub history: Vec<RelationStateView>,
}

const UNKNOWN_ENTITY: &str = "Unknown";

// ============================================================================
// Handlers
// ============================================================================

/// ListTimeline Handler - 按绝对刻度升序
pub struct ListTimelineHandler {
    store: Arc<dyn BookStorePort>,
}

impl ListTimelineHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListTimeline,
    ) -> Result<Vec<TimelineEventView>, ApplicationError> {
        let mut uow = self.store.begin().await?;
        uow.find_book(query.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", query.book_id))?;

        let era_names: HashMap<Uuid, String> = uow
            .find_eras(query.book_id)
            .await?
            .into_iter()
            .map(|era| (era.id, era.name))
            .collect();
        let entity_names: HashMap<Uuid, String> = uow
            .find_entities(query.book_id)
            .await?
            .into_iter()
            .map(|entity| (entity.id, entity.name))
            .collect();

        let mut views = Vec::new();
        for event in uow.find_timeline_events(query.book_id).await? {
            let participants = uow
                .find_participants(event.id)
                .await?
                .into_iter()
                .map(|p| ParticipantView {
                    name: entity_names
                        .get(&p.entity_id)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_ENTITY.to_string()),
                    entity_id: p.entity_id,
                    role: p.role,
                })
                .collect();

            views.push(TimelineEventView {
                era_name: event.era_id.and_then(|id| era_names.get(&id).cloned()),
                id: event.id,
                title: event.title,
                description: event.description,
                era_id: event.era_id,
                year_in_era: event.year_in_era,
                month_in_era: event.month_in_era,
                day_in_era: event.day_in_era,
                absolute_tick: event.absolute_tick,
                participants,
            });
        }
        uow.rollback().await?;

        Ok(views)
    }
}

/// ListRelationships Handler
pub struct ListRelationshipsHandler {
    store: Arc<dyn BookStorePort>,
}

impl ListRelationshipsHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListRelationships,
    ) -> Result<Vec<RelationshipView>, ApplicationError> {
        let mut uow = self.store.begin().await?;
        uow.find_book(query.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", query.book_id))?;

        let names: HashMap<Uuid, String> = uow
            .find_entities(query.book_id)
            .await?
            .into_iter()
            .map(|entity| (entity.id, entity.name))
            .collect();
        let name_of = |id: &Uuid| {
            names
                .get(id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_ENTITY.to_string())
        };

        let mut views = Vec::new();
        for relationship in uow.find_relationships(query.book_id).await? {
            // 已按 start_tick 升序，最后一条即当前状态
            let history: Vec<RelationStateView> = uow
                .find_relationship_snapshots(relationship.id)
                .await?
                .into_iter()
                .map(RelationStateView::from)
                .collect();

            views.push(RelationshipView {
                id: relationship.id,
                source_name: name_of(&relationship.source_id),
                source_id: relationship.source_id,
                target_name: name_of(&relationship.target_id),
                target_id: relationship.target_id,
                current: history.last().cloned(),
                history,
            });
        }
        uow.rollback().await?;

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{memory_store, seed_book};

    #[tokio::test]
    async fn test_timeline_is_ordered_by_tick() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let timeline = ListTimelineHandler::new(store)
            .handle(ListTimeline { book_id })
            .await
            .unwrap();
        let ticks: Vec<i64> = timeline.iter().map(|e| e.absolute_tick).collect();
        assert_eq!(ticks, vec![3, 12, 10_005]);
        assert_eq!(timeline[2].era_name.as_deref(), Some("天启"));
        assert_eq!(timeline[2].participants.len(), 2);
    }

    #[tokio::test]
    async fn test_relationship_current_state() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let relationships = ListRelationshipsHandler::new(store)
            .handle(ListRelationships { book_id })
            .await
            .unwrap();
        let pair = relationships
            .iter()
            .find(|r| r.history.len() == 2)
            .unwrap();
        assert_eq!(pair.source_name, "林晚");
        assert_eq!(pair.target_name, "沈砚");
        assert_eq!(pair.current.as_ref().unwrap().relation_type, "敌对");
    }

    #[tokio::test]
    async fn test_timeline_of_missing_book() {
        let store = memory_store().await;
        let result = ListTimelineHandler::new(store)
            .handle(ListTimeline {
                book_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
