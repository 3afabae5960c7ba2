//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod book_store;
mod repositories;

pub use book_store::{BookStorePort, BookUnitOfWork};
pub use repositories::{
    BookRecord, ChapterRecord, EntityRecord, EraRecord, EventParticipantRecord,
    RelationshipRecord, RelationshipSnapshotRecord, RepositoryError, TimelineEventRecord,
    VolumeRecord,
};
