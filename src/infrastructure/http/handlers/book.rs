//! Book HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::handlers::{BookCreated, ManuscriptImported};
use crate::application::queries::handlers::{BookDetail, BookSummary};
use crate::application::{
    CreateBook, DeleteBook, GetBook, ImportManuscript, ListBooks, RenderManuscript,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty, IdRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// 创建书籍
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<Json<ApiResponse<BookCreated>>, ApiError> {
    let created = state
        .create_book_handler
        .handle(CreateBook {
            title: req.title,
            summary: req.summary,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// 获取书籍列表
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookSummary>>>, ApiError> {
    let books = state.list_books_handler.handle(ListBooks).await?;
    Ok(Json(ApiResponse::success(books)))
}

/// 获取书籍详情（含卷章目录）
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<BookDetail>>, ApiError> {
    let detail = state
        .get_book_handler
        .handle(GetBook { book_id: req.id })
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// 删除书籍
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_book_handler
        .handle(DeleteBook { book_id: req.id })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 上传 TXT 稿件，按章节标题切分为新书
///
/// multipart 字段：`file`（必填）、`title`（可选，默认取文件名）
pub async fn import_manuscript(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ManuscriptImported>>, ApiError> {
    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read title: {}", e)))?,
                );
            }
            "file" => {
                filename = field.file_name().map(|s| s.to_string());

                let content_type = field.content_type().unwrap_or("application/octet-stream");
                let is_txt = filename
                    .as_ref()
                    .map(|f| f.to_lowercase().ends_with(".txt"))
                    .unwrap_or(false);
                if !is_txt && !content_type.starts_with("text/") {
                    return Err(ApiError::BadRequest(
                        "Only TXT files are allowed".to_string(),
                    ));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                if bytes.len() > state.limits.max_upload_bytes {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "File too large. Maximum size is {} bytes",
                        state.limits.max_upload_bytes
                    )));
                }

                content = Some(String::from_utf8(bytes.to_vec()).map_err(|_| {
                    ApiError::BadRequest("File must be valid UTF-8 text".to_string())
                })?);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    let title = title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            filename.as_ref().and_then(|f| {
                PathBuf::from(f)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
        })
        .unwrap_or_else(|| "未命名".to_string());

    let imported = state
        .import_manuscript_handler
        .handle(ImportManuscript {
            title,
            text: content,
            source_name: filename,
        })
        .await?;

    Ok(Json(ApiResponse::success(imported)))
}

/// 下载整书稿件（HTML）
pub async fn download_manuscript(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let rendered = state
        .render_manuscript_handler
        .handle(RenderManuscript { book_id })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"manuscript-{}.html\"", book_id),
            ),
        ],
        rendered.html,
    )
        .into_response())
}
