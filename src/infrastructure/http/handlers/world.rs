//! World HTTP Handlers - 卷、章节、设定实体、纪元

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::handlers::{
    ChapterCreated, EntityCreated, EraCreated, VolumeCreated,
};
use crate::application::{CreateChapter, CreateEntity, CreateEra, CreateVolume};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVolumeRequest {
    pub book_id: Uuid,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub volume_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntityRequest {
    pub book_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEraRequest {
    pub book_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_tick: Option<i64>,
}

/// 新建卷
pub async fn create_volume(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVolumeRequest>,
) -> Result<Json<ApiResponse<VolumeCreated>>, ApiError> {
    let created = state
        .create_volume_handler
        .handle(CreateVolume {
            book_id: req.book_id,
            title: req.title,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

/// 新建章节
pub async fn create_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterCreated>>, ApiError> {
    let created = state
        .create_chapter_handler
        .handle(CreateChapter {
            volume_id: req.volume_id,
            title: req.title,
            content: req.content,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

/// 新建设定实体（人物、地点、物品）
pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntityRequest>,
) -> Result<Json<ApiResponse<EntityCreated>>, ApiError> {
    let created = state
        .create_entity_handler
        .handle(CreateEntity {
            book_id: req.book_id,
            name: req.name,
            kind: req.kind,
            description: req.description,
            avatar_url: req.avatar_url,
            attributes: req.attributes,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn create_era(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEraRequest>,
) -> Result<Json<ApiResponse<EraCreated>>, ApiError> {
    let created = state
        .create_era_handler
        .handle(CreateEra {
            book_id: req.book_id,
            name: req.name,
            description: req.description,
            start_tick: req.start_tick,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}
