//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// 通用请求
// ============================================================================

/// 按 ID 操作的请求体
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: Uuid,
}

/// 按书籍 ID 查询的请求体
#[derive(Debug, Deserialize)]
pub struct BookIdRequest {
    pub book_id: Uuid,
}
