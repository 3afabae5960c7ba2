//! World Command Handlers - 卷、章节、实体、纪元

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{CreateChapter, CreateEntity, CreateEra, CreateVolume};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookStorePort, BookUnitOfWork, ChapterRecord, EntityRecord, EraRecord, VolumeRecord,
};
use crate::domain::book::{count_words, BookError, DEFAULT_CHAPTER_STATUS};
use crate::domain::timeline::default_era_start;

/// 非空名称，去掉首尾空白
pub(crate) fn require_name(value: &str, field: &str) -> Result<String, ApplicationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookError::InvalidName(format!("{} 不能为空", field)).into());
    }
    Ok(trimmed.to_string())
}

/// 确认书籍存在
pub(crate) async fn ensure_book(
    uow: &mut dyn BookUnitOfWork,
    book_id: Uuid,
) -> Result<(), ApplicationError> {
    uow.find_book(book_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApplicationError::not_found("Book", book_id))
}

// ============================================================================
// CreateVolume
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VolumeCreated {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub order_index: i64,
}

/// CreateVolume Handler - 新卷排在最后
pub struct CreateVolumeHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateVolumeHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: CreateVolume) -> Result<VolumeCreated, ApplicationError> {
        let title = require_name(&command.title, "卷名")?;

        let mut uow = self.store.begin().await?;
        ensure_book(uow.as_mut(), command.book_id).await?;

        let order_index = uow
            .find_volumes(command.book_id)
            .await?
            .last()
            .map_or(1, |v| v.order_index + 1);

        let volume = VolumeRecord {
            id: Uuid::new_v4(),
            book_id: command.book_id,
            title,
            order_index,
        };
        uow.insert_volume(&volume).await?;
        uow.commit().await?;

        tracing::debug!(book_id = %volume.book_id, volume_id = %volume.id, order_index, "Volume created");

        Ok(VolumeCreated {
            id: volume.id,
            book_id: volume.book_id,
            title: volume.title,
            order_index,
        })
    }
}

// ============================================================================
// CreateChapter
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChapterCreated {
    pub id: Uuid,
    pub volume_id: Uuid,
    pub title: String,
    pub word_count: i64,
    pub order_index: i64,
}

/// CreateChapter Handler - 字数由内容推导
pub struct CreateChapterHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateChapterHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: CreateChapter) -> Result<ChapterCreated, ApplicationError> {
        let title = require_name(&command.title, "章节名")?;

        let mut uow = self.store.begin().await?;
        uow.find_volume(command.volume_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Volume", command.volume_id))?;

        let order_index = uow
            .find_chapters(command.volume_id)
            .await?
            .last()
            .map_or(1, |c| c.order_index + 1);

        let chapter = ChapterRecord {
            id: Uuid::new_v4(),
            volume_id: command.volume_id,
            title,
            word_count: count_words(&command.content),
            content: command.content,
            status: DEFAULT_CHAPTER_STATUS.to_string(),
            order_index,
        };
        uow.insert_chapter(&chapter).await?;
        uow.commit().await?;

        Ok(ChapterCreated {
            id: chapter.id,
            volume_id: chapter.volume_id,
            title: chapter.title,
            word_count: chapter.word_count,
            order_index,
        })
    }
}

// ============================================================================
// CreateEntity
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EntityCreated {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// CreateEntity Handler
pub struct CreateEntityHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateEntityHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: CreateEntity) -> Result<EntityCreated, ApplicationError> {
        let name = require_name(&command.name, "名称")?;
        let kind = require_name(&command.kind, "类型")?;

        let attributes = match command.attributes {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(value @ serde_json::Value::Object(_)) => value,
            Some(_) => return Err(ApplicationError::validation("attributes 必须是对象")),
        };

        let mut uow = self.store.begin().await?;
        ensure_book(uow.as_mut(), command.book_id).await?;

        let entity = EntityRecord {
            id: Uuid::new_v4(),
            book_id: command.book_id,
            name,
            kind,
            description: command.description,
            avatar_url: command.avatar_url,
            attributes,
        };
        uow.insert_entity(&entity).await?;
        uow.commit().await?;

        Ok(EntityCreated {
            id: entity.id,
            book_id: entity.book_id,
            name: entity.name,
            kind: entity.kind,
        })
    }
}

// ============================================================================
// CreateEra
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EraCreated {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub order_index: i64,
    pub start_absolute_tick: i64,
}

/// CreateEra Handler
///
/// 排序号 = 最后一个纪元 + 1；未指定起始刻度时接在最后一个纪元之后
pub struct CreateEraHandler {
    store: Arc<dyn BookStorePort>,
}

impl CreateEraHandler {
    pub fn new(store: Arc<dyn BookStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: CreateEra) -> Result<EraCreated, ApplicationError> {
        let name = require_name(&command.name, "纪元名")?;

        let mut uow = self.store.begin().await?;
        ensure_book(uow.as_mut(), command.book_id).await?;

        let eras = uow.find_eras(command.book_id).await?;
        let last = eras.iter().max_by_key(|era| era.order_index);

        let era = EraRecord {
            id: Uuid::new_v4(),
            book_id: command.book_id,
            name,
            description: command.description,
            order_index: last.map_or(1, |era| era.order_index + 1),
            start_absolute_tick: default_era_start(
                command.start_tick,
                last.map(|era| era.start_absolute_tick),
            ),
        };
        uow.insert_era(&era).await?;
        uow.commit().await?;

        tracing::debug!(
            book_id = %era.book_id,
            era_id = %era.id,
            start_absolute_tick = era.start_absolute_tick,
            "Era created"
        );

        Ok(EraCreated {
            id: era.id,
            book_id: era.book_id,
            name: era.name,
            order_index: era.order_index,
            start_absolute_tick: era.start_absolute_tick,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::CreateBookHandler;
    use crate::application::commands::CreateBook;
    use crate::application::test_support::memory_store;

    async fn book(store: &Arc<dyn BookStorePort>) -> (Uuid, Uuid) {
        let created = CreateBookHandler::new(store.clone())
            .handle(CreateBook {
                title: "群星".to_string(),
                summary: None,
            })
            .await
            .unwrap();
        (created.id, created.default_volume_id)
    }

    fn era(book_id: Uuid, name: &str, start_tick: Option<i64>) -> CreateEra {
        CreateEra {
            book_id,
            name: name.to_string(),
            description: None,
            start_tick,
        }
    }

    #[tokio::test]
    async fn test_era_default_start_ticks() {
        let store = memory_store().await;
        let (book_id, _) = book(&store).await;
        let handler = CreateEraHandler::new(store);

        let first = handler.handle(era(book_id, "开元", None)).await.unwrap();
        assert_eq!(first.start_absolute_tick, 0);
        assert_eq!(first.order_index, 1);

        let second = handler.handle(era(book_id, "天宝", None)).await.unwrap();
        assert_eq!(second.start_absolute_tick, 10_000);

        let third = handler
            .handle(era(book_id, "至德", Some(25_000)))
            .await
            .unwrap();
        assert_eq!(third.start_absolute_tick, 25_000);
        assert_eq!(third.order_index, 3);

        let fourth = handler.handle(era(book_id, "乾元", None)).await.unwrap();
        assert_eq!(fourth.start_absolute_tick, 35_000);
    }

    #[tokio::test]
    async fn test_era_requires_book() {
        let store = memory_store().await;
        let result = CreateEraHandler::new(store)
            .handle(era(Uuid::new_v4(), "开元", None))
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::NotFound {
                resource_type: "Book",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_volume_and_chapter_ordering() {
        let store = memory_store().await;
        let (book_id, default_volume_id) = book(&store).await;

        let volume = CreateVolumeHandler::new(store.clone())
            .handle(CreateVolume {
                book_id,
                title: "第二卷".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(volume.order_index, 2);

        let chapters = CreateChapterHandler::new(store);
        let first = chapters
            .handle(CreateChapter {
                volume_id: default_volume_id,
                title: "第一章".to_string(),
                content: "<p>风起。</p>".to_string(),
            })
            .await
            .unwrap();
        let second = chapters
            .handle(CreateChapter {
                volume_id: default_volume_id,
                title: "第二章".to_string(),
                content: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(first.order_index, 1);
        assert_eq!(first.word_count, 3);
        assert_eq!(second.order_index, 2);
        assert_eq!(second.word_count, 0);
    }

    #[tokio::test]
    async fn test_entity_attributes_must_be_object() {
        let store = memory_store().await;
        let (book_id, _) = book(&store).await;

        let result = CreateEntityHandler::new(store)
            .handle(CreateEntity {
                book_id,
                name: "林".to_string(),
                kind: "character".to_string(),
                description: None,
                avatar_url: None,
                attributes: Some(serde_json::json!([1, 2])),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }
}
