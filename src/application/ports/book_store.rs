//! Book Store Port - 出站端口
//!
//! 所有读写都经过一个工作单元（事务）：
//! - 读：在同一事务内读取整本书，得到一致的逻辑视图
//! - 写：全部成功后 `commit`；`rollback` 或直接丢弃工作单元则撤销所有写入

use async_trait::async_trait;
use uuid::Uuid;

use super::repositories::{
    BookRecord, ChapterRecord, EntityRecord, EraRecord, EventParticipantRecord,
    RelationshipRecord, RelationshipSnapshotRecord, RepositoryError, TimelineEventRecord,
    VolumeRecord,
};

/// Book Store Port
#[async_trait]
pub trait BookStorePort: Send + Sync {
    /// 开启一个工作单元
    async fn begin(&self) -> Result<Box<dyn BookUnitOfWork>, RepositoryError>;
}

/// 工作单元：一次事务内的全部读写
#[async_trait]
pub trait BookUnitOfWork: Send {
    // ========== Book ==========

    async fn find_book(&mut self, id: Uuid) -> Result<Option<BookRecord>, RepositoryError>;

    async fn list_books(&mut self) -> Result<Vec<BookRecord>, RepositoryError>;

    async fn insert_book(&mut self, book: &BookRecord) -> Result<(), RepositoryError>;

    /// 级联删除整本书，返回是否存在
    async fn delete_book(&mut self, id: Uuid) -> Result<bool, RepositoryError>;

    // ========== Volume / Chapter ==========

    /// 按 `order_index` 升序
    async fn find_volumes(&mut self, book_id: Uuid) -> Result<Vec<VolumeRecord>, RepositoryError>;

    async fn find_volume(&mut self, id: Uuid) -> Result<Option<VolumeRecord>, RepositoryError>;

    async fn insert_volume(&mut self, volume: &VolumeRecord) -> Result<(), RepositoryError>;

    /// 按 `order_index` 升序
    async fn find_chapters(
        &mut self,
        volume_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError>;

    async fn insert_chapter(&mut self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    // ========== Entity ==========

    async fn find_entities(&mut self, book_id: Uuid) -> Result<Vec<EntityRecord>, RepositoryError>;

    async fn find_entity(&mut self, id: Uuid) -> Result<Option<EntityRecord>, RepositoryError>;

    async fn insert_entity(&mut self, entity: &EntityRecord) -> Result<(), RepositoryError>;

    // ========== Era ==========

    /// 按 `start_absolute_tick` 升序
    async fn find_eras(&mut self, book_id: Uuid) -> Result<Vec<EraRecord>, RepositoryError>;

    async fn find_era(&mut self, id: Uuid) -> Result<Option<EraRecord>, RepositoryError>;

    async fn insert_era(&mut self, era: &EraRecord) -> Result<(), RepositoryError>;

    // ========== Timeline ==========

    /// 按 `absolute_tick` 升序
    async fn find_timeline_events(
        &mut self,
        book_id: Uuid,
    ) -> Result<Vec<TimelineEventRecord>, RepositoryError>;

    async fn find_timeline_event(
        &mut self,
        id: Uuid,
    ) -> Result<Option<TimelineEventRecord>, RepositoryError>;

    async fn insert_timeline_event(
        &mut self,
        event: &TimelineEventRecord,
    ) -> Result<(), RepositoryError>;

    async fn update_timeline_event(
        &mut self,
        event: &TimelineEventRecord,
    ) -> Result<(), RepositoryError>;

    async fn find_participants(
        &mut self,
        event_id: Uuid,
    ) -> Result<Vec<EventParticipantRecord>, RepositoryError>;

    async fn insert_participant(
        &mut self,
        participant: &EventParticipantRecord,
    ) -> Result<(), RepositoryError>;

    // ========== Relationship ==========

    async fn find_relationships(
        &mut self,
        book_id: Uuid,
    ) -> Result<Vec<RelationshipRecord>, RepositoryError>;

    /// 按有序实体对查找（插入前查重）
    async fn find_relationship_by_pair(
        &mut self,
        book_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
    ) -> Result<Option<RelationshipRecord>, RepositoryError>;

    async fn insert_relationship(
        &mut self,
        relationship: &RelationshipRecord,
    ) -> Result<(), RepositoryError>;

    /// 按 `start_tick` 升序
    async fn find_relationship_snapshots(
        &mut self,
        relationship_id: Uuid,
    ) -> Result<Vec<RelationshipSnapshotRecord>, RepositoryError>;

    async fn insert_relationship_snapshot(
        &mut self,
        snapshot: &RelationshipSnapshotRecord,
    ) -> Result<(), RepositoryError>;

    // ========== Transaction ==========

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
