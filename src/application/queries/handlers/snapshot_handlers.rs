//! Snapshot Query Handler - 构建全书快照

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::BookStorePort;
use crate::application::queries::BuildSnapshot;
use crate::domain::snapshot::{
    BookSnapshot, SnapshotChapter, SnapshotEntity, SnapshotEra, SnapshotEvent,
    SnapshotParticipant, SnapshotRelationState, SnapshotRelationship, SnapshotVolume,
};

/// BuildSnapshot Handler
///
/// 整本书在同一个工作单元内读取，得到一致视图；只读，结束时回滚。
/// 快照中的链接键是当前记录 ID 的字符串形式。
pub struct BuildSnapshotHandler {
    store: Arc<dyn BookStorePort>,
}

impl BuildSnapshotHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: BuildSnapshot) -> Result<BookSnapshot, ApplicationError> {
        let mut uow = self.store.begin().await?;
        let book = uow
            .find_book(query.book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", query.book_id))?;

        let mut volumes = Vec::new();
        for volume in uow.find_volumes(book.id).await? {
            let chapters = uow
                .find_chapters(volume.id)
                .await?
                .into_iter()
                .map(|chapter| SnapshotChapter {
                    title: chapter.title,
                    content: chapter.content,
                    word_count: chapter.word_count,
                    status: chapter.status,
                    order_index: chapter.order_index,
                })
                .collect();
            volumes.push(SnapshotVolume {
                title: volume.title,
                order_index: volume.order_index,
                chapters,
            });
        }

        let entities = uow
            .find_entities(book.id)
            .await?
            .into_iter()
            .map(|entity| SnapshotEntity {
                id: entity.id.to_string(),
                name: entity.name,
                kind: entity.kind,
                description: entity.description,
                avatar_url: entity.avatar_url,
                attributes: entity.attributes,
            })
            .collect();

        let eras = uow
            .find_eras(book.id)
            .await?
            .into_iter()
            .map(|era| SnapshotEra {
                id: era.id.to_string(),
                name: era.name,
                description: era.description,
                order_index: era.order_index,
                start_absolute_tick: era.start_absolute_tick,
            })
            .collect();

        let mut timeline_events = Vec::new();
        for event in uow.find_timeline_events(book.id).await? {
            let event_participants = uow
                .find_participants(event.id)
                .await?
                .into_iter()
                .map(|participant| SnapshotParticipant {
                    entity_id: participant.entity_id.to_string(),
                    role: participant.role,
                })
                .collect();
            timeline_events.push(SnapshotEvent {
                id: event.id.to_string(),
                title: event.title,
                description: event.description,
                era_id: event.era_id.map(|id| id.to_string()),
                year_in_era: event.year_in_era,
                month_in_era: event.month_in_era,
                day_in_era: event.day_in_era,
                absolute_tick: event.absolute_tick,
                event_participants,
            });
        }

        let mut relationships = Vec::new();
        for relationship in uow.find_relationships(book.id).await? {
            let relationship_snapshots = uow
                .find_relationship_snapshots(relationship.id)
                .await?
                .into_iter()
                .map(|state| SnapshotRelationState {
                    start_tick: state.start_tick,
                    relation_type: state.relation_type,
                    label: state.label,
                })
                .collect();
            relationships.push(SnapshotRelationship {
                entity_a_id: relationship.source_id.to_string(),
                entity_b_id: relationship.target_id.to_string(),
                relationship_snapshots,
            });
        }

        uow.rollback().await?;

        let snapshot = BookSnapshot {
            title: book.title,
            summary: book.summary,
            status: book.status,
            cover_url: book.cover_url,
            volumes,
            entities,
            eras,
            timeline_events,
            relationships,
        };

        let dangling = snapshot.dangling_references();
        if let Some(first) = dangling.first() {
            return Err(ApplicationError::integrity(format!(
                "book {} has {} unresolved reference(s), first: {}",
                query.book_id,
                dangling.len(),
                first
            )));
        }

        tracing::info!(
            book_id = %query.book_id,
            volumes = snapshot.volumes.len(),
            chapters = snapshot.chapter_count(),
            entities = snapshot.entities.len(),
            eras = snapshot.eras.len(),
            timeline_events = snapshot.timeline_events.len(),
            relationships = snapshot.relationships.len(),
            "Snapshot built"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ApplicationError;
    use crate::application::test_support::{memory_store, seed_book};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_snapshot_is_closed() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let snapshot = BuildSnapshotHandler::new(store)
            .handle(BuildSnapshot { book_id })
            .await
            .unwrap();
        assert!(snapshot.dangling_references().is_empty());
        assert_eq!(snapshot.volumes.len(), 2);
        assert_eq!(snapshot.entities.len(), 3);
        assert_eq!(snapshot.eras.len(), 2);
        assert!(!snapshot.timeline_events.is_empty());
        assert!(snapshot
            .timeline_events
            .windows(2)
            .all(|w| w[0].absolute_tick <= w[1].absolute_tick));
        assert!(snapshot
            .relationships
            .iter()
            .any(|r| r.relationship_snapshots.len() == 2));
    }

    #[tokio::test]
    async fn test_snapshot_is_idempotent() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;
        let handler = BuildSnapshotHandler::new(store);

        let first = handler.handle(BuildSnapshot { book_id }).await.unwrap();
        let second = handler.handle(BuildSnapshot { book_id }).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.to_json_pretty().unwrap(),
            second.to_json_pretty().unwrap()
        );
    }

    #[tokio::test]
    async fn test_snapshot_of_missing_book() {
        let store = memory_store().await;
        let result = BuildSnapshotHandler::new(store)
            .handle(BuildSnapshot {
                book_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_json_uses_integer_ticks() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let snapshot = BuildSnapshotHandler::new(store)
            .handle(BuildSnapshot { book_id })
            .await
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();
        assert!(value["eras"][1]["start_absolute_tick"].is_i64());
        assert!(value["timeline_events"][0]["absolute_tick"].is_i64());
        assert_eq!(value["entities"][0]["type"], "character");
    }
}
