//! SQLite Book Store
//!
//! 工作单元 = 一个 sqlx 事务。提交前的写入对其他连接不可见；
//! 事务被丢弃（未提交）时 sqlx 自动回滚。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, Transaction};
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    BookRecord, BookStorePort, BookUnitOfWork, ChapterRecord, EntityRecord, EraRecord,
    EventParticipantRecord, RelationshipRecord, RelationshipSnapshotRecord, RepositoryError,
    TimelineEventRecord, VolumeRecord,
};

/// SQLite Book Store
pub struct SqliteBookStore {
    pool: DbPool,
}

impl SqliteBookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStorePort for SqliteBookStore {
    async fn begin(&self) -> Result<Box<dyn BookUnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// 基于 sqlx 事务的工作单元
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

fn db_error(err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::Duplicate(db_err.message().to_string());
        }
    }
    RepositoryError::DatabaseError(err.to_string())
}

fn parse_uuid(value: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn parse_optional_uuid(value: Option<String>) -> Result<Option<Uuid>, RepositoryError> {
    value.as_deref().map(parse_uuid).transpose()
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
        .with_timezone(&Utc))
}

// ============================================================================
// Rows
// ============================================================================

#[derive(FromRow)]
struct BookRow {
    id: String,
    title: String,
    summary: Option<String>,
    status: String,
    cover_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<BookRow> for BookRecord {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(BookRecord {
            id: parse_uuid(&row.id)?,
            title: row.title,
            summary: row.summary,
            status: row.status,
            cover_url: row.cover_url,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct VolumeRow {
    id: String,
    book_id: String,
    title: String,
    order_index: i64,
}

impl TryFrom<VolumeRow> for VolumeRecord {
    type Error = RepositoryError;

    fn try_from(row: VolumeRow) -> Result<Self, Self::Error> {
        Ok(VolumeRecord {
            id: parse_uuid(&row.id)?,
            book_id: parse_uuid(&row.book_id)?,
            title: row.title,
            order_index: row.order_index,
        })
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    volume_id: String,
    title: String,
    content: String,
    word_count: i64,
    status: String,
    order_index: i64,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: parse_uuid(&row.id)?,
            volume_id: parse_uuid(&row.volume_id)?,
            title: row.title,
            content: row.content,
            word_count: row.word_count,
            status: row.status,
            order_index: row.order_index,
        })
    }
}

#[derive(FromRow)]
struct EntityRow {
    id: String,
    book_id: String,
    name: String,
    kind: String,
    description: Option<String>,
    avatar_url: Option<String>,
    attributes: String,
}

impl TryFrom<EntityRow> for EntityRecord {
    type Error = RepositoryError;

    fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
        Ok(EntityRecord {
            id: parse_uuid(&row.id)?,
            book_id: parse_uuid(&row.book_id)?,
            name: row.name,
            kind: row.kind,
            description: row.description,
            avatar_url: row.avatar_url,
            attributes: serde_json::from_str(&row.attributes)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
        })
    }
}

#[derive(FromRow)]
struct EraRow {
    id: String,
    book_id: String,
    name: String,
    description: Option<String>,
    order_index: i64,
    start_absolute_tick: i64,
}

impl TryFrom<EraRow> for EraRecord {
    type Error = RepositoryError;

    fn try_from(row: EraRow) -> Result<Self, Self::Error> {
        Ok(EraRecord {
            id: parse_uuid(&row.id)?,
            book_id: parse_uuid(&row.book_id)?,
            name: row.name,
            description: row.description,
            order_index: row.order_index,
            start_absolute_tick: row.start_absolute_tick,
        })
    }
}

#[derive(FromRow)]
struct TimelineEventRow {
    id: String,
    book_id: String,
    era_id: Option<String>,
    title: String,
    description: Option<String>,
    year_in_era: Option<i64>,
    month_in_era: Option<i64>,
    day_in_era: Option<i64>,
    absolute_tick: i64,
}

impl TryFrom<TimelineEventRow> for TimelineEventRecord {
    type Error = RepositoryError;

    fn try_from(row: TimelineEventRow) -> Result<Self, Self::Error> {
        Ok(TimelineEventRecord {
            id: parse_uuid(&row.id)?,
            book_id: parse_uuid(&row.book_id)?,
            era_id: parse_optional_uuid(row.era_id)?,
            title: row.title,
            description: row.description,
            year_in_era: row.year_in_era,
            month_in_era: row.month_in_era,
            day_in_era: row.day_in_era,
            absolute_tick: row.absolute_tick,
        })
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    id: String,
    event_id: String,
    entity_id: String,
    role: String,
}

impl TryFrom<ParticipantRow> for EventParticipantRecord {
    type Error = RepositoryError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(EventParticipantRecord {
            id: parse_uuid(&row.id)?,
            event_id: parse_uuid(&row.event_id)?,
            entity_id: parse_uuid(&row.entity_id)?,
            role: row.role,
        })
    }
}

#[derive(FromRow)]
struct RelationshipRow {
    id: String,
    book_id: String,
    entity_a_id: String,
    entity_b_id: String,
}

impl TryFrom<RelationshipRow> for RelationshipRecord {
    type Error = RepositoryError;

    fn try_from(row: RelationshipRow) -> Result<Self, Self::Error> {
        Ok(RelationshipRecord {
            id: parse_uuid(&row.id)?,
            book_id: parse_uuid(&row.book_id)?,
            source_id: parse_uuid(&row.entity_a_id)?,
            target_id: parse_uuid(&row.entity_b_id)?,
        })
    }
}

#[derive(FromRow)]
struct RelationshipSnapshotRow {
    id: String,
    relationship_id: String,
    start_tick: i64,
    relation_type: String,
    label: Option<String>,
}

impl TryFrom<RelationshipSnapshotRow> for RelationshipSnapshotRecord {
    type Error = RepositoryError;

    fn try_from(row: RelationshipSnapshotRow) -> Result<Self, Self::Error> {
        Ok(RelationshipSnapshotRecord {
            id: parse_uuid(&row.id)?,
            relationship_id: parse_uuid(&row.relationship_id)?,
            start_tick: row.start_tick,
            relation_type: row.relation_type,
            label: row.label,
        })
    }
}

const BOOK_COLUMNS: &str = "id, title, summary, status, cover_url, created_at, updated_at";
const VOLUME_COLUMNS: &str = "id, book_id, title, order_index";
const CHAPTER_COLUMNS: &str = "id, volume_id, title, content, word_count, status, order_index";
const ENTITY_COLUMNS: &str =
    "id, book_id, name, type AS kind, description, avatar_url, attributes";
const ERA_COLUMNS: &str = "id, book_id, name, description, order_index, start_absolute_tick";
const EVENT_COLUMNS: &str = "id, book_id, era_id, title, description, year_in_era, month_in_era, day_in_era, absolute_tick";
const PARTICIPANT_COLUMNS: &str = "id, event_id, entity_id, role";
const RELATIONSHIP_COLUMNS: &str = "id, book_id, entity_a_id, entity_b_id";
const RELATIONSHIP_SNAPSHOT_COLUMNS: &str =
    "id, relationship_id, start_tick, relation_type, label";

// ============================================================================
// Unit of work
// ============================================================================

#[async_trait]
impl BookUnitOfWork for SqliteUnitOfWork {
    async fn find_book(&mut self, id: Uuid) -> Result<Option<BookRecord>, RepositoryError> {
        let row: Option<BookRow> =
            sqlx::query_as(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_error)?;

        row.map(BookRecord::try_from).transpose()
    }

    async fn list_books(&mut self) -> Result<Vec<BookRecord>, RepositoryError> {
        let rows: Vec<BookRow> = sqlx::query_as(&format!(
            "SELECT {} FROM books ORDER BY created_at DESC",
            BOOK_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(BookRecord::try_from).collect()
    }

    async fn insert_book(&mut self, book: &BookRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, summary, status, cover_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(book.id.to_string())
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.status)
        .bind(&book.cover_url)
        .bind(book.created_at.to_rfc3339())
        .bind(book.updated_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_book(&mut self, id: Uuid) -> Result<bool, RepositoryError> {
        let book_id = id.to_string();

        // 实体的依赖方（参与者、关系快照、关系）必须先于实体删除
        let statements = [
            "DELETE FROM relationship_snapshots WHERE relationship_id IN (SELECT id FROM relationships WHERE book_id = ?)",
            "DELETE FROM relationships WHERE book_id = ?",
            "DELETE FROM event_participants WHERE event_id IN (SELECT id FROM timeline_events WHERE book_id = ?)",
            "DELETE FROM timeline_events WHERE book_id = ?",
            "DELETE FROM entities WHERE book_id = ?",
            "DELETE FROM eras WHERE book_id = ?",
            "DELETE FROM chapters WHERE volume_id IN (SELECT id FROM volumes WHERE book_id = ?)",
            "DELETE FROM volumes WHERE book_id = ?",
        ];

        for statement in statements {
            sqlx::query(statement)
                .bind(&book_id)
                .execute(&mut *self.tx)
                .await
                .map_err(db_error)?;
        }

        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(&book_id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_volumes(&mut self, book_id: Uuid) -> Result<Vec<VolumeRecord>, RepositoryError> {
        let rows: Vec<VolumeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM volumes WHERE book_id = ? ORDER BY order_index",
            VOLUME_COLUMNS
        ))
        .bind(book_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(VolumeRecord::try_from).collect()
    }

    async fn find_volume(&mut self, id: Uuid) -> Result<Option<VolumeRecord>, RepositoryError> {
        let row: Option<VolumeRow> =
            sqlx::query_as(&format!("SELECT {} FROM volumes WHERE id = ?", VOLUME_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_error)?;

        row.map(VolumeRecord::try_from).transpose()
    }

    async fn insert_volume(&mut self, volume: &VolumeRecord) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO volumes (id, book_id, title, order_index) VALUES (?, ?, ?, ?)")
            .bind(volume.id.to_string())
            .bind(volume.book_id.to_string())
            .bind(&volume.title)
            .bind(volume.order_index)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;

        Ok(())
    }

    async fn find_chapters(
        &mut self,
        volume_id: Uuid,
    ) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE volume_id = ? ORDER BY order_index",
            CHAPTER_COLUMNS
        ))
        .bind(volume_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn insert_chapter(&mut self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, volume_id, title, content, word_count, status, order_index)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.volume_id.to_string())
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(chapter.word_count)
        .bind(&chapter.status)
        .bind(chapter.order_index)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_entities(&mut self, book_id: Uuid) -> Result<Vec<EntityRecord>, RepositoryError> {
        let rows: Vec<EntityRow> = sqlx::query_as(&format!(
            "SELECT {} FROM entities WHERE book_id = ? ORDER BY name, rowid",
            ENTITY_COLUMNS
        ))
        .bind(book_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(EntityRecord::try_from).collect()
    }

    async fn find_entity(&mut self, id: Uuid) -> Result<Option<EntityRecord>, RepositoryError> {
        let row: Option<EntityRow> =
            sqlx::query_as(&format!("SELECT {} FROM entities WHERE id = ?", ENTITY_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_error)?;

        row.map(EntityRecord::try_from).transpose()
    }

    async fn insert_entity(&mut self, entity: &EntityRecord) -> Result<(), RepositoryError> {
        let attributes = serde_json::to_string(&entity.attributes)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO entities (id, book_id, name, type, description, avatar_url, attributes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entity.id.to_string())
        .bind(entity.book_id.to_string())
        .bind(&entity.name)
        .bind(&entity.kind)
        .bind(&entity.description)
        .bind(&entity.avatar_url)
        .bind(attributes)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_eras(&mut self, book_id: Uuid) -> Result<Vec<EraRecord>, RepositoryError> {
        let rows: Vec<EraRow> = sqlx::query_as(&format!(
            "SELECT {} FROM eras WHERE book_id = ? ORDER BY start_absolute_tick, order_index, rowid",
            ERA_COLUMNS
        ))
        .bind(book_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(EraRecord::try_from).collect()
    }

    async fn find_era(&mut self, id: Uuid) -> Result<Option<EraRecord>, RepositoryError> {
        let row: Option<EraRow> =
            sqlx::query_as(&format!("SELECT {} FROM eras WHERE id = ?", ERA_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_error)?;

        row.map(EraRecord::try_from).transpose()
    }

    async fn insert_era(&mut self, era: &EraRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO eras (id, book_id, name, description, order_index, start_absolute_tick)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(era.id.to_string())
        .bind(era.book_id.to_string())
        .bind(&era.name)
        .bind(&era.description)
        .bind(era.order_index)
        .bind(era.start_absolute_tick)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_timeline_events(
        &mut self,
        book_id: Uuid,
    ) -> Result<Vec<TimelineEventRecord>, RepositoryError> {
        let rows: Vec<TimelineEventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM timeline_events WHERE book_id = ? ORDER BY absolute_tick, rowid",
            EVENT_COLUMNS
        ))
        .bind(book_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TimelineEventRecord::try_from).collect()
    }

    async fn find_timeline_event(
        &mut self,
        id: Uuid,
    ) -> Result<Option<TimelineEventRecord>, RepositoryError> {
        let row: Option<TimelineEventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM timeline_events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;

        row.map(TimelineEventRecord::try_from).transpose()
    }

    async fn insert_timeline_event(
        &mut self,
        event: &TimelineEventRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO timeline_events
                (id, book_id, era_id, title, description, year_in_era, month_in_era, day_in_era, absolute_tick)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.book_id.to_string())
        .bind(event.era_id.map(|id| id.to_string()))
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.year_in_era)
        .bind(event.month_in_era)
        .bind(event.day_in_era)
        .bind(event.absolute_tick)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn update_timeline_event(
        &mut self,
        event: &TimelineEventRecord,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE timeline_events
            SET era_id = ?, title = ?, description = ?, year_in_era = ?,
                month_in_era = ?, day_in_era = ?, absolute_tick = ?
            WHERE id = ?
            "#,
        )
        .bind(event.era_id.map(|id| id.to_string()))
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.year_in_era)
        .bind(event.month_in_era)
        .bind(event.day_in_era)
        .bind(event.absolute_tick)
        .bind(event.id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "timeline event {}",
                event.id
            )));
        }

        Ok(())
    }

    async fn find_participants(
        &mut self,
        event_id: Uuid,
    ) -> Result<Vec<EventParticipantRecord>, RepositoryError> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM event_participants WHERE event_id = ? ORDER BY rowid",
            PARTICIPANT_COLUMNS
        ))
        .bind(event_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(EventParticipantRecord::try_from).collect()
    }

    async fn insert_participant(
        &mut self,
        participant: &EventParticipantRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO event_participants (id, event_id, entity_id, role) VALUES (?, ?, ?, ?)",
        )
        .bind(participant.id.to_string())
        .bind(participant.event_id.to_string())
        .bind(participant.entity_id.to_string())
        .bind(&participant.role)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_relationships(
        &mut self,
        book_id: Uuid,
    ) -> Result<Vec<RelationshipRecord>, RepositoryError> {
        let rows: Vec<RelationshipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM relationships WHERE book_id = ? ORDER BY rowid",
            RELATIONSHIP_COLUMNS
        ))
        .bind(book_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(RelationshipRecord::try_from).collect()
    }

    async fn find_relationship_by_pair(
        &mut self,
        book_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
    ) -> Result<Option<RelationshipRecord>, RepositoryError> {
        let row: Option<RelationshipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM relationships WHERE book_id = ? AND entity_a_id = ? AND entity_b_id = ?",
            RELATIONSHIP_COLUMNS
        ))
        .bind(book_id.to_string())
        .bind(source_id.to_string())
        .bind(target_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;

        row.map(RelationshipRecord::try_from).transpose()
    }

    async fn insert_relationship(
        &mut self,
        relationship: &RelationshipRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO relationships (id, book_id, entity_a_id, entity_b_id) VALUES (?, ?, ?, ?)",
        )
        .bind(relationship.id.to_string())
        .bind(relationship.book_id.to_string())
        .bind(relationship.source_id.to_string())
        .bind(relationship.target_id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_relationship_snapshots(
        &mut self,
        relationship_id: Uuid,
    ) -> Result<Vec<RelationshipSnapshotRecord>, RepositoryError> {
        let rows: Vec<RelationshipSnapshotRow> = sqlx::query_as(&format!(
            "SELECT {} FROM relationship_snapshots WHERE relationship_id = ? ORDER BY start_tick, rowid",
            RELATIONSHIP_SNAPSHOT_COLUMNS
        ))
        .bind(relationship_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(RelationshipSnapshotRecord::try_from)
            .collect()
    }

    async fn insert_relationship_snapshot(
        &mut self,
        snapshot: &RelationshipSnapshotRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO relationship_snapshots (id, relationship_id, start_tick, relation_type, label)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(snapshot.id.to_string())
        .bind(snapshot.relationship_id.to_string())
        .bind(snapshot.start_tick)
        .bind(&snapshot.relation_type)
        .bind(&snapshot.label)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(db_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn store() -> SqliteBookStore {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteBookStore::new(pool)
    }

    fn book(title: &str) -> BookRecord {
        let now = Utc::now();
        BookRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            summary: None,
            status: "ongoing".to_string(),
            cover_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let store = store().await;
        let record = book("草稿");

        let mut uow = store.begin().await.unwrap();
        uow.insert_book(&record).await.unwrap();
        assert!(uow.find_book(record.id).await.unwrap().is_some());
        drop(uow);

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_book(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let store = store().await;
        let record = book("定稿");

        let mut uow = store.begin().await.unwrap();
        uow.insert_book(&record).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let found = uow.find_book(record.id).await.unwrap().unwrap();
        assert_eq!(found.title, "定稿");
    }

    #[tokio::test]
    async fn test_duplicate_volume_order_is_rejected() {
        let store = store().await;
        let record = book("卷序");

        let mut uow = store.begin().await.unwrap();
        uow.insert_book(&record).await.unwrap();
        for _ in 0..2 {
            let volume = VolumeRecord {
                id: Uuid::new_v4(),
                book_id: record.id,
                title: "第一卷".to_string(),
                order_index: 1,
            };
            let result = uow.insert_volume(&volume).await;
            if result.is_err() {
                assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
                return;
            }
        }
        panic!("second volume with the same order_index should be rejected");
    }

    #[tokio::test]
    async fn test_large_ticks_round_trip() {
        let store = store().await;
        let record = book("远古");
        let era = EraRecord {
            id: Uuid::new_v4(),
            book_id: record.id,
            name: "太初".to_string(),
            description: None,
            order_index: 1,
            start_absolute_tick: 9_007_199_254_740_993,
        };

        let mut uow = store.begin().await.unwrap();
        uow.insert_book(&record).await.unwrap();
        uow.insert_era(&era).await.unwrap();

        let found = uow.find_era(era.id).await.unwrap().unwrap();
        assert_eq!(found.start_absolute_tick, 9_007_199_254_740_993);
    }

    #[tokio::test]
    async fn test_delete_book_cascades() {
        let store = store().await;
        let record = book("删除");
        let entity = EntityRecord {
            id: Uuid::new_v4(),
            book_id: record.id,
            name: "林".to_string(),
            kind: "character".to_string(),
            description: None,
            avatar_url: None,
            attributes: serde_json::json!({ "age": 17 }),
        };
        let other = EntityRecord {
            id: Uuid::new_v4(),
            name: "周".to_string(),
            ..entity.clone()
        };
        let relationship = RelationshipRecord {
            id: Uuid::new_v4(),
            book_id: record.id,
            source_id: entity.id,
            target_id: other.id,
        };

        let mut uow = store.begin().await.unwrap();
        uow.insert_book(&record).await.unwrap();
        uow.insert_entity(&entity).await.unwrap();
        uow.insert_entity(&other).await.unwrap();
        uow.insert_relationship(&relationship).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.delete_book(record.id).await.unwrap());
        assert!(uow.find_entities(record.id).await.unwrap().is_empty());
        assert!(uow.find_relationships(record.id).await.unwrap().is_empty());
        assert!(!uow.delete_book(record.id).await.unwrap());
    }
}
