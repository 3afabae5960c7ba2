//! Restore Handler - 从快照恢复为新书
//!
//! 整个恢复在一个工作单元内按固定阶段执行:
//! 1. 书籍（书名 + 副本后缀）
//! 2. 卷与章节
//! 3. 实体（登记 Entity 映射）
//! 4. 纪元（登记 Era 映射）
//! 5. 时间线事件（纪元必须可解析；绝对刻度按新纪元重算；无法解析的参与者丢弃）
//! 6. 关系（端点无法解析则跳过该关系及其状态）
//!
//! 任一阶段出错都会回滚，调用方看不到半本书。

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::timeline_handlers::DEFAULT_PARTICIPANT_ROLE;
use crate::application::commands::RestoreBook;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookRecord, BookStorePort, BookUnitOfWork, ChapterRecord, EntityRecord, EraRecord,
    EventParticipantRecord, RelationshipRecord, RelationshipSnapshotRecord, TimelineEventRecord,
    VolumeRecord,
};
use crate::domain::book::BookTitle;
use crate::domain::snapshot::{
    BookSnapshot, IdRemapTable, RemapCategory, SnapshotEvent, SnapshotRelationship,
};
use crate::domain::timeline::resolve_absolute_tick;

/// 默认副本后缀
pub const DEFAULT_COPY_SUFFIX: &str = " (副本)";

/// 恢复结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    pub book_id: Uuid,
    pub title: String,
    pub volumes: usize,
    pub chapters: usize,
    pub entities: usize,
    pub eras: usize,
    pub timeline_events: usize,
    pub participants: usize,
    pub relationships: usize,
    pub relationship_snapshots: usize,
    /// 实体无法解析而丢弃的事件参与者
    pub dropped_participants: usize,
    /// 端点无法解析而跳过的关系
    pub skipped_relationships: usize,
}

/// RestoreBook Handler
pub struct RestoreBookHandler {
    store: Arc<dyn BookStorePort>,
    copy_suffix: String,
}

impl RestoreBookHandler {
    pub fn new(store: Arc<dyn BookStorePort>, copy_suffix: impl Into<String>) -> Self {
        Self {
            store,
            copy_suffix: copy_suffix.into(),
        }
    }

    pub async fn handle(&self, command: RestoreBook) -> Result<RestoreReport, ApplicationError> {
        let snapshot = command.snapshot;

        // 写入前的检查，失败时不产生任何副作用
        snapshot.validate()?;
        let title = BookTitle::new(snapshot.title.as_str())
            .map_err(|e| ApplicationError::MalformedSnapshot(e.to_string()))?
            .copy_of(&self.copy_suffix);

        let book_id = command.target_id.unwrap_or_else(Uuid::new_v4);
        let uow = self.store.begin().await?;

        let mut run = RestoreRun {
            uow,
            book_id,
            remap: IdRemapTable::new(),
            era_starts: HashMap::new(),
            report: RestoreReport {
                book_id,
                title: title.into_inner(),
                ..Default::default()
            },
        };

        match run.execute(&snapshot).await {
            Ok(()) => {
                let RestoreRun { uow, report, .. } = run;
                uow.commit().await?;

                tracing::info!(
                    book_id = %report.book_id,
                    title = %report.title,
                    volumes = report.volumes,
                    chapters = report.chapters,
                    entities = report.entities,
                    eras = report.eras,
                    timeline_events = report.timeline_events,
                    relationships = report.relationships,
                    dropped_participants = report.dropped_participants,
                    skipped_relationships = report.skipped_relationships,
                    "Book restored from snapshot"
                );

                Ok(report)
            }
            Err(err) => {
                tracing::error!(
                    book_id = %book_id,
                    kind = err.kind(),
                    error = %err,
                    "Restore failed, rolling back"
                );
                if let Err(rollback_err) = run.uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed; transaction dropped");
                }
                Err(err)
            }
        }
    }
}

/// 单次恢复的可变状态，随调用结束丢弃
struct RestoreRun {
    uow: Box<dyn BookUnitOfWork>,
    book_id: Uuid,
    remap: IdRemapTable,
    /// 新纪元 ID -> 起始刻度
    era_starts: HashMap<Uuid, i64>,
    report: RestoreReport,
}

impl RestoreRun {
    async fn execute(&mut self, snapshot: &BookSnapshot) -> Result<(), ApplicationError> {
        self.create_book(snapshot).await?;
        self.restore_volumes(snapshot).await?;
        self.restore_entities(snapshot).await?;
        self.restore_eras(snapshot).await?;
        for event in &snapshot.timeline_events {
            self.restore_event(event).await?;
        }
        self.restore_relationships(&snapshot.relationships).await?;
        Ok(())
    }

    async fn create_book(&mut self, snapshot: &BookSnapshot) -> Result<(), ApplicationError> {
        let now = Utc::now();
        let book = BookRecord {
            id: self.book_id,
            title: self.report.title.clone(),
            summary: snapshot.summary.clone(),
            status: snapshot.status.clone(),
            cover_url: snapshot.cover_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.uow.insert_book(&book).await?;
        Ok(())
    }

    async fn restore_volumes(&mut self, snapshot: &BookSnapshot) -> Result<(), ApplicationError> {
        for volume in &snapshot.volumes {
            let record = VolumeRecord {
                id: Uuid::new_v4(),
                book_id: self.book_id,
                title: volume.title.clone(),
                order_index: volume.order_index,
            };
            self.uow.insert_volume(&record).await?;
            self.report.volumes += 1;

            for chapter in &volume.chapters {
                self.uow
                    .insert_chapter(&ChapterRecord {
                        id: Uuid::new_v4(),
                        volume_id: record.id,
                        title: chapter.title.clone(),
                        content: chapter.content.clone(),
                        word_count: chapter.word_count,
                        status: chapter.status.clone(),
                        order_index: chapter.order_index,
                    })
                    .await?;
                self.report.chapters += 1;
            }
        }
        Ok(())
    }

    async fn restore_entities(&mut self, snapshot: &BookSnapshot) -> Result<(), ApplicationError> {
        for entity in &snapshot.entities {
            let record = EntityRecord {
                id: Uuid::new_v4(),
                book_id: self.book_id,
                name: entity.name.clone(),
                kind: entity.kind.clone(),
                description: entity.description.clone(),
                avatar_url: entity.avatar_url.clone(),
                attributes: entity.attributes.clone(),
            };
            self.uow.insert_entity(&record).await?;
            self.remap
                .record(RemapCategory::Entity, entity.id.as_str(), record.id);
            self.report.entities += 1;
        }
        Ok(())
    }

    async fn restore_eras(&mut self, snapshot: &BookSnapshot) -> Result<(), ApplicationError> {
        for era in &snapshot.eras {
            let record = EraRecord {
                id: Uuid::new_v4(),
                book_id: self.book_id,
                name: era.name.clone(),
                description: era.description.clone(),
                order_index: era.order_index,
                start_absolute_tick: era.start_absolute_tick,
            };
            self.uow.insert_era(&record).await?;
            self.remap.record(RemapCategory::Era, era.id.as_str(), record.id);
            self.era_starts.insert(record.id, record.start_absolute_tick);
            self.report.eras += 1;
        }
        Ok(())
    }

    async fn restore_event(&mut self, event: &SnapshotEvent) -> Result<(), ApplicationError> {
        let era_id = match &event.era_id {
            None => None,
            Some(old_id) => Some(self.remap.resolve(RemapCategory::Era, old_id).ok_or_else(
                || {
                    ApplicationError::integrity(format!(
                        "event {} references era {} which is not in the snapshot",
                        event.id, old_id
                    ))
                },
            )?),
        };
        let era_start = era_id.and_then(|id| self.era_starts.get(&id).copied());

        let record = TimelineEventRecord {
            id: Uuid::new_v4(),
            book_id: self.book_id,
            era_id,
            title: event.title.clone(),
            description: event.description.clone(),
            year_in_era: event.year_in_era,
            month_in_era: event.month_in_era,
            day_in_era: event.day_in_era,
            absolute_tick: resolve_absolute_tick(era_start, event.year_in_era),
        };
        self.uow.insert_timeline_event(&record).await?;
        self.report.timeline_events += 1;

        for participant in &event.event_participants {
            let Some(entity_id) = self
                .remap
                .resolve(RemapCategory::Entity, &participant.entity_id)
            else {
                tracing::warn!(
                    book_id = %self.book_id,
                    event_id = %event.id,
                    entity_id = %participant.entity_id,
                    "Dropping participant with unknown entity"
                );
                self.report.dropped_participants += 1;
                continue;
            };

            let role = if participant.role.trim().is_empty() {
                DEFAULT_PARTICIPANT_ROLE.to_string()
            } else {
                participant.role.clone()
            };
            self.uow
                .insert_participant(&EventParticipantRecord {
                    id: Uuid::new_v4(),
                    event_id: record.id,
                    entity_id,
                    role,
                })
                .await?;
            self.report.participants += 1;
        }
        Ok(())
    }

    async fn restore_relationships(
        &mut self,
        relationships: &[SnapshotRelationship],
    ) -> Result<(), ApplicationError> {
        // 快照里同一有序实体对可能出现多次，合并到同一条关系
        let mut by_pair: HashMap<(Uuid, Uuid), Uuid> = HashMap::new();

        for relationship in relationships {
            let source = self
                .remap
                .resolve(RemapCategory::Entity, &relationship.entity_a_id);
            let target = self
                .remap
                .resolve(RemapCategory::Entity, &relationship.entity_b_id);
            let (Some(source_id), Some(target_id)) = (source, target) else {
                tracing::warn!(
                    book_id = %self.book_id,
                    entity_a_id = %relationship.entity_a_id,
                    entity_b_id = %relationship.entity_b_id,
                    states = relationship.relationship_snapshots.len(),
                    "Skipping relationship with unknown endpoint"
                );
                self.report.skipped_relationships += 1;
                continue;
            };

            let relationship_id = match by_pair.get(&(source_id, target_id)) {
                Some(id) => *id,
                None => {
                    let record = RelationshipRecord {
                        id: Uuid::new_v4(),
                        book_id: self.book_id,
                        source_id,
                        target_id,
                    };
                    self.uow.insert_relationship(&record).await?;
                    by_pair.insert((source_id, target_id), record.id);
                    self.report.relationships += 1;
                    record.id
                }
            };

            for state in &relationship.relationship_snapshots {
                self.uow
                    .insert_relationship_snapshot(&RelationshipSnapshotRecord {
                        id: Uuid::new_v4(),
                        relationship_id,
                        start_tick: state.start_tick,
                        relation_type: state.relation_type.clone(),
                        label: state.label.clone(),
                    })
                    .await?;
                self.report.relationship_snapshots += 1;
            }
        }
        Ok(())
    }
}
