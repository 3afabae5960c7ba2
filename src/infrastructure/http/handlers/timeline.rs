//! Timeline HTTP Handlers - 时间线事件与人物关系

use axum::{extract::State, Json};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::handlers::{RelationshipSaved, TimelineEventSaved};
use crate::application::queries::handlers::{RelationshipView, TimelineEventView};
use crate::application::{
    CreateRelationship, CreateTimelineEvent, ListRelationships, ListTimeline,
    UpdateTimelineEvent,
};
use crate::infrastructure::http::dto::{ApiResponse, BookIdRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub book_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub era_id: Option<Uuid>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub day: Option<i64>,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
}

/// 字段缺失为 `None`，显式 `null` 为 `Some(None)`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub era_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRelationshipRequest {
    pub book_id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(rename = "type")]
    pub relation_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub start_tick: Option<i64>,
}

/// 新建时间线事件
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<TimelineEventSaved>>, ApiError> {
    let saved = state
        .create_event_handler
        .handle(CreateTimelineEvent {
            book_id: req.book_id,
            title: req.title,
            description: req.description,
            era_id: req.era_id,
            year: req.year,
            month: req.month,
            day: req.day,
            participant_ids: req.participant_ids,
        })
        .await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// 更新时间线事件，纪元或年份变化时重算绝对刻度
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<TimelineEventSaved>>, ApiError> {
    let saved = state
        .update_event_handler
        .handle(UpdateTimelineEvent {
            event_id: req.id,
            title: req.title,
            description: req.description,
            era_id: req.era_id,
            year: req.year,
        })
        .await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// 按绝对刻度列出全书事件
pub async fn list_timeline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> Result<Json<ApiResponse<Vec<TimelineEventView>>>, ApiError> {
    let events = state
        .list_timeline_handler
        .handle(ListTimeline {
            book_id: req.book_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(events)))
}

/// 新建关系或为已有实体对追加一条关系状态
pub async fn create_relationship(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRelationshipRequest>,
) -> Result<Json<ApiResponse<RelationshipSaved>>, ApiError> {
    let saved = state
        .create_relationship_handler
        .handle(CreateRelationship {
            book_id: req.book_id,
            source_id: req.source_id,
            target_id: req.target_id,
            relation_type: req.relation_type,
            label: req.label,
            start_tick: req.start_tick,
        })
        .await?;
    Ok(Json(ApiResponse::success(saved)))
}

pub async fn list_relationships(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> Result<Json<ApiResponse<Vec<RelationshipView>>>, ApiError> {
    let relationships = state
        .list_relationships_handler
        .handle(ListRelationships {
            book_id: req.book_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(relationships)))
}
