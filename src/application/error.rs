//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。调用方只会得到一个终态：成功结果，或下列错误之一。

use thiserror::Error;
use uuid::Uuid;

use crate::domain::book::BookError;
use crate::domain::snapshot::SnapshotError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 必需的交叉引用无法解析（恢复中检出，触发整体回滚）
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// 快照结构无效（写入前检出，无任何副作用）
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// 存储层拒绝或无法完成写入
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建完整性错误
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityViolation(message.into())
    }

    /// 错误类别名（用于日志字段）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::ValidationError(_) => "validation",
            Self::IntegrityViolation(_) => "integrity_violation",
            Self::MalformedSnapshot(_) => "malformed_snapshot",
            Self::StorageFailure(_) => "storage_failure",
        }
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl From<SnapshotError> for ApplicationError {
    fn from(err: SnapshotError) -> Self {
        Self::MalformedSnapshot(err.to_string())
    }
}

impl From<BookError> for ApplicationError {
    fn from(err: BookError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
