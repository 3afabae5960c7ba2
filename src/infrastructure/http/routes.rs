//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                        GET   健康检查
//! - /api/book/create                 POST  新建书籍（附带默认卷）
//! - /api/book/list                   GET   列出所有书籍
//! - /api/book/get                    POST  书籍详情与卷章目录
//! - /api/book/delete                 POST  删除书籍及其全部内容
//! - /api/book/import                 POST  上传 TXT 稿件并切分章节
//! - /api/book/manuscript/:book_id    GET   下载整书 HTML 稿件
//! - /api/backup/export/:book_id      GET   导出全书快照
//! - /api/backup/import               POST  上传快照文件并恢复为新书
//! - /api/backup/restore              POST  以 JSON 请求体恢复快照
//! - /api/world/volume                POST  新建卷
//! - /api/world/chapter               POST  新建章节
//! - /api/world/entity                POST  新建设定实体
//! - /api/world/era                   POST  新建纪元
//! - /api/timeline/create             POST  新建事件
//! - /api/timeline/update             POST  更新事件
//! - /api/timeline/list               POST  按刻度列出事件
//! - /api/relationship/create         POST  新建关系或追加关系状态
//! - /api/relationship/list           POST  列出关系及其历史

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/book", book_routes())
        .nest("/backup", backup_routes())
        .nest("/world", world_routes())
        .nest("/timeline", timeline_routes())
        .nest("/relationship", relationship_routes())
}

fn book_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_book))
        .route("/list", get(handlers::list_books))
        .route("/get", post(handlers::get_book))
        .route("/delete", post(handlers::delete_book))
        .route("/import", post(handlers::import_manuscript))
        .route("/manuscript/:book_id", get(handlers::download_manuscript))
}

fn backup_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export/:book_id", get(handlers::export_book))
        .route("/import", post(handlers::import_backup))
        .route("/restore", post(handlers::restore_backup))
}

fn world_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/volume", post(handlers::create_volume))
        .route("/chapter", post(handlers::create_chapter))
        .route("/entity", post(handlers::create_entity))
        .route("/era", post(handlers::create_era))
}

fn timeline_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_event))
        .route("/update", post(handlers::update_event))
        .route("/list", post(handlers::list_timeline))
}

fn relationship_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_relationship))
        .route("/list", post(handlers::list_relationships))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{memory_store, seed_book};
    use crate::application::BookStorePort;
    use crate::infrastructure::http::error::errno;
    use crate::infrastructure::http::state::RequestLimits;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    const LIMITS: RequestLimits = RequestLimits {
        max_snapshot_bytes: 64 * 1024,
        max_upload_bytes: 1024,
    };

    fn router(store: Arc<dyn BookStorePort>) -> Router {
        let state = AppState::new(store, " (副本)", LIMITS);
        create_routes().with_state(Arc::new(state))
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "saga-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/plain\r\n\r\n",
                b = boundary,
                f = filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = router(memory_store().await);
        let request = Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_then_get_book() {
        let store = memory_store().await;

        let response = router(store.clone())
            .oneshot(post_json("/api/book/create", json!({ "title": "长夜" })))
            .await
            .unwrap();
        let created = read_json(response).await;
        assert_eq!(created["errno"], 0);
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let response = router(store)
            .oneshot(post_json("/api/book/get", json!({ "id": id })))
            .await
            .unwrap();
        let detail = read_json(response).await;
        assert_eq!(detail["data"]["title"], "长夜");
        assert_eq!(detail["data"]["volumes"][0]["title"], "第一卷");
    }

    #[tokio::test]
    async fn test_missing_book_reports_errno_with_http_ok() {
        let app = router(memory_store().await);

        let response = app
            .oneshot(post_json("/api/book/get", json!({ "id": Uuid::new_v4() })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["errno"], errno::NOT_FOUND);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_export_then_restore_round_trip() {
        let store = memory_store().await;
        let book_id = seed_book(&store).await;

        let request = Request::builder()
            .uri(format!("/api/backup/export/{}", book_id))
            .body(Body::empty())
            .unwrap();
        let response = router(store.clone()).oneshot(request).await.unwrap();
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        let exported = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let response = router(store.clone())
            .oneshot(multipart("/api/backup/import", "backup.json", &exported))
            .await
            .unwrap();
        let report = read_json(response).await;
        assert_eq!(report["errno"], 0);
        assert_eq!(report["data"]["title"], "雁城旧事 (副本)");
        assert_eq!(report["data"]["timeline_events"], 3);
        assert_eq!(report["data"]["relationships"], 2);

        let response = router(store)
            .oneshot(Request::builder().uri("/api/book/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let books = read_json(response).await;
        assert_eq!(books["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_with_unknown_era_is_unprocessable() {
        let store = memory_store().await;
        let snapshot = json!({
            "title": "残卷",
            "eras": [],
            "timeline_events": [
                { "id": "e1", "title": "孤事", "era_id": "missing", "absolute_tick": 1 }
            ]
        });

        let response = router(store.clone())
            .oneshot(post_json("/api/backup/restore", snapshot))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], errno::UNPROCESSABLE);

        let response = router(store)
            .oneshot(Request::builder().uri("/api/book/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let books = read_json(response).await;
        assert!(books["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_bad_request() {
        let app = router(memory_store().await);
        let request = Request::builder()
            .method("POST")
            .uri("/api/backup/restore")
            .body(Body::from("{ not json"))
            .unwrap();

        let body = read_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_manuscript_is_rejected() {
        let app = router(memory_store().await);
        let content = "字".repeat(LIMITS.max_upload_bytes);

        let response = app
            .oneshot(multipart("/api/book/import", "long.txt", content.as_bytes()))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], errno::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_import_manuscript_uses_file_stem_as_title() {
        let app = router(memory_store().await);
        let text = "第一章 开端\n风起。\n第二章 转折\n云涌。";

        let response = app
            .oneshot(multipart("/api/book/import", "风云.txt", text.as_bytes()))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["title"], "风云");
        assert_eq!(body["data"]["chapters"], 2);
    }
}
