//! 测试辅助：内存数据库与示例书籍

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::handlers::{
    CreateBookHandler, CreateChapterHandler, CreateEntityHandler, CreateEraHandler,
    CreateRelationshipHandler, CreateTimelineEventHandler, CreateVolumeHandler,
};
use crate::application::commands::{
    CreateBook, CreateChapter, CreateEntity, CreateEra, CreateRelationship, CreateTimelineEvent,
    CreateVolume,
};
use crate::application::ports::BookStorePort;
use crate::domain::snapshot::BookSnapshot;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, DbPool, SqliteBookStore,
};

pub async fn memory_pool() -> DbPool {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub fn store_from(pool: DbPool) -> Arc<dyn BookStorePort> {
    Arc::new(SqliteBookStore::new(pool))
}

pub async fn memory_store() -> Arc<dyn BookStorePort> {
    store_from(memory_pool().await)
}

/// 创建一本内容完整的书：两卷、三个实体、两个纪元、三个事件、两条关系
///
/// 事件刻度依次为 3、12、10005；林晚 -> 沈砚 有两条关系状态
pub async fn seed_book(store: &Arc<dyn BookStorePort>) -> Uuid {
    let book = CreateBookHandler::new(store.clone())
        .handle(CreateBook {
            title: "雁城旧事".to_string(),
            summary: Some("边城里的十年".to_string()),
        })
        .await
        .unwrap();

    let chapters = CreateChapterHandler::new(store.clone());
    for (title, content) in [
        ("第一章 初雪", "<p>雪落在城墙上。</p>"),
        ("第二章 空白", ""),
    ] {
        chapters
            .handle(CreateChapter {
                volume_id: book.default_volume_id,
                title: title.to_string(),
                content: content.to_string(),
            })
            .await
            .unwrap();
    }

    let second = CreateVolumeHandler::new(store.clone())
        .handle(CreateVolume {
            book_id: book.id,
            title: "第二卷".to_string(),
        })
        .await
        .unwrap();
    chapters
        .handle(CreateChapter {
            volume_id: second.id,
            title: "第三章 归途".to_string(),
            content: "<p>他回来了。</p><p>城还在。</p>".to_string(),
        })
        .await
        .unwrap();

    let entities = CreateEntityHandler::new(store.clone());
    let mut ids = HashMap::new();
    for (name, kind, attributes) in [
        ("林晚", "character", serde_json::json!({ "age": 19 })),
        ("沈砚", "character", serde_json::json!({})),
        ("雁城", "location", serde_json::json!({ "population": 12000 })),
    ] {
        let entity = entities
            .handle(CreateEntity {
                book_id: book.id,
                name: name.to_string(),
                kind: kind.to_string(),
                description: Some(format!("{}的设定", name)),
                avatar_url: None,
                attributes: Some(attributes),
            })
            .await
            .unwrap();
        ids.insert(name, entity.id);
    }

    let eras = CreateEraHandler::new(store.clone());
    let mut era_ids = Vec::new();
    for name in ["永和", "天启"] {
        let era = eras
            .handle(CreateEra {
                book_id: book.id,
                name: name.to_string(),
                description: None,
                start_tick: None,
            })
            .await
            .unwrap();
        era_ids.push(era.id);
    }

    let events = CreateTimelineEventHandler::new(store.clone());
    for (title, era_id, year, participants) in [
        ("天启元变", Some(era_ids[1]), Some(5), vec![ids["林晚"], ids["沈砚"]]),
        ("城门初开", Some(era_ids[0]), Some(3), vec![ids["林晚"]]),
        ("无纪之年", None, Some(12), vec![ids["雁城"]]),
    ] {
        events
            .handle(CreateTimelineEvent {
                book_id: book.id,
                title: title.to_string(),
                description: None,
                era_id,
                year,
                month: Some(1),
                day: None,
                participant_ids: participants,
            })
            .await
            .unwrap();
    }

    let relationships = CreateRelationshipHandler::new(store.clone());
    for (source, target, relation_type, start_tick) in [
        ("林晚", "沈砚", "同门", 0),
        ("林晚", "雁城", "居住", 0),
        ("林晚", "沈砚", "敌对", 10_005),
    ] {
        relationships
            .handle(CreateRelationship {
                book_id: book.id,
                source_id: ids[source],
                target_id: ids[target],
                relation_type: relation_type.to_string(),
                label: None,
                start_tick: Some(start_tick),
            })
            .await
            .unwrap();
    }

    book.id
}

/// 把快照中的链接键替换为按位置编号的稳定名字，便于比较两份快照的结构
pub fn normalize_ids(mut snapshot: BookSnapshot) -> BookSnapshot {
    let mut entities = HashMap::new();
    for (index, entity) in snapshot.entities.iter_mut().enumerate() {
        let stable = format!("entity-{}", index);
        entities.insert(std::mem::replace(&mut entity.id, stable.clone()), stable);
    }
    let mut eras = HashMap::new();
    for (index, era) in snapshot.eras.iter_mut().enumerate() {
        let stable = format!("era-{}", index);
        eras.insert(std::mem::replace(&mut era.id, stable.clone()), stable);
    }

    for (index, event) in snapshot.timeline_events.iter_mut().enumerate() {
        event.id = format!("event-{}", index);
        if let Some(era_id) = event.era_id.as_mut() {
            if let Some(stable) = eras.get(era_id.as_str()) {
                *era_id = stable.clone();
            }
        }
        for participant in &mut event.event_participants {
            if let Some(stable) = entities.get(&participant.entity_id) {
                participant.entity_id = stable.clone();
            }
        }
    }
    for relationship in &mut snapshot.relationships {
        for endpoint in [&mut relationship.entity_a_id, &mut relationship.entity_b_id] {
            if let Some(stable) = entities.get(endpoint.as_str()) {
                *endpoint = stable.clone();
            }
        }
    }

    snapshot
}
