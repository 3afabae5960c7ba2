//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::commands::handlers::{
    CreateBookHandler, CreateChapterHandler, CreateEntityHandler, CreateEraHandler,
    CreateRelationshipHandler, CreateTimelineEventHandler, CreateVolumeHandler,
    DeleteBookHandler, ImportManuscriptHandler, RestoreBookHandler, UpdateTimelineEventHandler,
};
use crate::application::queries::handlers::{
    BuildSnapshotHandler, GetBookHandler, ListBooksHandler, ListRelationshipsHandler,
    ListTimelineHandler, RenderManuscriptHandler,
};
use crate::application::BookStorePort;

/// 请求体大小限制
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    /// 快照（JSON 或上传文件）最大字节数
    pub max_snapshot_bytes: usize,
    /// 稿件上传最大字节数
    pub max_upload_bytes: usize,
}

impl RequestLimits {
    /// 路由级请求体上限取两者较大值，具体上限由各处理函数再检查
    pub fn body_limit(&self) -> usize {
        self.max_snapshot_bytes.max(self.max_upload_bytes)
    }
}

/// 应用状态
pub struct AppState {
    pub limits: RequestLimits,

    // ========== Command Handlers ==========
    pub create_book_handler: CreateBookHandler,
    pub delete_book_handler: DeleteBookHandler,
    pub import_manuscript_handler: ImportManuscriptHandler,
    pub restore_book_handler: RestoreBookHandler,
    pub create_volume_handler: CreateVolumeHandler,
    pub create_chapter_handler: CreateChapterHandler,
    pub create_entity_handler: CreateEntityHandler,
    pub create_era_handler: CreateEraHandler,
    pub create_event_handler: CreateTimelineEventHandler,
    pub update_event_handler: UpdateTimelineEventHandler,
    pub create_relationship_handler: CreateRelationshipHandler,

    // ========== Query Handlers ==========
    pub get_book_handler: GetBookHandler,
    pub list_books_handler: ListBooksHandler,
    pub render_manuscript_handler: RenderManuscriptHandler,
    pub build_snapshot_handler: BuildSnapshotHandler,
    pub list_timeline_handler: ListTimelineHandler,
    pub list_relationships_handler: ListRelationshipsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        store: Arc<dyn BookStorePort>,
        copy_suffix: impl Into<String>,
        limits: RequestLimits,
    ) -> Self {
        Self {
            limits,

            // Command handlers
            create_book_handler: CreateBookHandler::new(store.clone()),
            delete_book_handler: DeleteBookHandler::new(store.clone()),
            import_manuscript_handler: ImportManuscriptHandler::new(store.clone()),
            restore_book_handler: RestoreBookHandler::new(store.clone(), copy_suffix),
            create_volume_handler: CreateVolumeHandler::new(store.clone()),
            create_chapter_handler: CreateChapterHandler::new(store.clone()),
            create_entity_handler: CreateEntityHandler::new(store.clone()),
            create_era_handler: CreateEraHandler::new(store.clone()),
            create_event_handler: CreateTimelineEventHandler::new(store.clone()),
            update_event_handler: UpdateTimelineEventHandler::new(store.clone()),
            create_relationship_handler: CreateRelationshipHandler::new(store.clone()),

            // Query handlers
            get_book_handler: GetBookHandler::new(store.clone()),
            list_books_handler: ListBooksHandler::new(store.clone()),
            render_manuscript_handler: RenderManuscriptHandler::new(store.clone()),
            build_snapshot_handler: BuildSnapshotHandler::new(store.clone()),
            list_timeline_handler: ListTimelineHandler::new(store.clone()),
            list_relationships_handler: ListRelationshipsHandler::new(store),
        }
    }
}
