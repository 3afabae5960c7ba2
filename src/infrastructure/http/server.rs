//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// HTTP 服务器
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(addr: impl Into<String>, state: AppState) -> Self {
        Self {
            addr: addr.into(),
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    pub fn build_router(&self) -> Router {
        // 导出接口以附件下载，需暴露 Content-Disposition
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE])
            .expose_headers([CONTENT_DISPOSITION])
            .max_age(std::time::Duration::from_secs(3600));

        create_routes()
            .layer(DefaultBodyLimit::max(self.state.limits.body_limit()))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        let listener = TcpListener::bind(&self.addr).await?;
        info!(
            addr = %self.addr,
            body_limit = self.state.limits.body_limit(),
            "HTTP server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::memory_store;
    use crate::infrastructure::http::state::RequestLimits;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_body_limit_rejects_oversized_request() {
        let limits = RequestLimits {
            max_snapshot_bytes: 16,
            max_upload_bytes: 8,
        };
        let state = AppState::new(memory_store().await, " (副本)", limits);
        let router = HttpServer::new("127.0.0.1:0", state).build_router();

        let request = Request::builder()
            .method("POST")
            .uri("/api/backup/restore")
            .body(Body::from(vec![b' '; 64]))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
