//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BookStore 工作单元与记录类型）
//! - commands: CQRS 命令及处理器（创作、导入、快照恢复）
//! - queries: CQRS 查询及处理器（详情、时间线、关系、快照构建）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    CreateBook, CreateChapter, CreateEntity, CreateEra, CreateRelationship, CreateTimelineEvent,
    CreateVolume, DeleteBook, ImportManuscript, RestoreBook, UpdateTimelineEvent,
    // Handlers
    handlers::{
        CreateBookHandler, CreateChapterHandler, CreateEntityHandler, CreateEraHandler,
        CreateRelationshipHandler, CreateTimelineEventHandler, CreateVolumeHandler,
        DeleteBookHandler, ImportManuscriptHandler, RestoreBookHandler, RestoreReport,
        UpdateTimelineEventHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{BookStorePort, BookUnitOfWork, RepositoryError};

pub use queries::{
    BuildSnapshot, GetBook, ListBooks, ListRelationships, ListTimeline, RenderManuscript,
    // Handlers
    handlers::{
        BuildSnapshotHandler, GetBookHandler, ListBooksHandler, ListRelationshipsHandler,
        ListTimelineHandler, RenderManuscriptHandler,
    },
};
