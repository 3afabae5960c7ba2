//! Saga - 长篇小说创作与全书备份服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书名、状态、字数统计
//! - Timeline Context: 纪元与绝对时间刻度
//! - Snapshot Context: 全书快照格式、校验与 ID 重映射
//!
//! 应用层 (application/):
//! - Ports: BookStore 工作单元
//! - Commands: 创作、导入与快照恢复
//! - Queries: 书籍详情、时间线、关系与快照构建
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
