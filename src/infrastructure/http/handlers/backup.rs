//! Backup HTTP Handlers - 快照导出、导入与恢复

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{BuildSnapshot, RestoreBook, RestoreReport};
use crate::domain::snapshot::BookSnapshot;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RestoreParams {
    /// 指定新书 ID（可选）
    #[serde(default)]
    pub target_id: Option<Uuid>,
}

fn check_snapshot_size(state: &AppState, len: usize) -> Result<(), ApiError> {
    if len > state.limits.max_snapshot_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "Snapshot too large. Maximum size is {} bytes",
            state.limits.max_snapshot_bytes
        )));
    }
    Ok(())
}

async fn restore(
    state: &AppState,
    bytes: &[u8],
    target_id: Option<Uuid>,
) -> Result<RestoreReport, ApiError> {
    check_snapshot_size(state, bytes.len())?;
    let snapshot = BookSnapshot::from_json(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Malformed snapshot: {}", e)))?;

    let report = state
        .restore_book_handler
        .handle(RestoreBook {
            snapshot,
            target_id,
        })
        .await?;
    Ok(report)
}

/// 导出全书快照（JSON 附件）
pub async fn export_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let snapshot = state
        .build_snapshot_handler
        .handle(BuildSnapshot { book_id })
        .await?;
    let body = snapshot
        .to_json_pretty()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize snapshot: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"backup-{}.json\"", book_id),
            ),
        ],
        body,
    )
        .into_response())
}

/// 上传快照文件并恢复为新书
///
/// multipart 字段：`file`（必填）；查询参数 `target_id`（可选）
pub async fn import_backup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RestoreParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<RestoreReport>>, ApiError> {
    let mut content: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            content = Some(bytes);
        }
    }

    let content = content.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    let report = restore(&state, &content, params.target_id).await?;

    Ok(Json(ApiResponse::success(report)))
}

/// 以 JSON 请求体直接恢复快照
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RestoreParams>,
    body: Bytes,
) -> Result<Json<ApiResponse<RestoreReport>>, ApiError> {
    let report = restore(&state, &body, params.target_id).await?;
    Ok(Json(ApiResponse::success(report)))
}
