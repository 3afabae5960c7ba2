//! Snapshot Context - 全书快照限界上下文
//!
//! 职责:
//! - 可移植的全书快照格式（JSON）
//! - 写入前的结构校验与引用闭包检查
//! - 恢复时旧 ID 到新 ID 的重映射表

mod errors;
mod model;
mod remap;
mod tick_format;

pub use errors::SnapshotError;
pub use model::{
    BookSnapshot, DanglingReference, SnapshotChapter, SnapshotEntity, SnapshotEra,
    SnapshotEvent, SnapshotParticipant, SnapshotRelationState, SnapshotRelationship,
    SnapshotVolume,
};
pub use remap::{IdRemapTable, RemapCategory};
