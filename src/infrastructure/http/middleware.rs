//! HTTP Middleware
//!
//! HTTP 状态码错误日志中间件

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 传输层错误日志
///
/// 只处理 4xx/5xx 状态码（如请求体超限、JSON 解析失败）。
/// 业务错误统一以 200 返回，在 `ApiError::into_response()` 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::DefaultBodyLimit,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    async fn echo(body: String) -> String {
        body
    }

    fn router() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .layer(DefaultBodyLimit::max(4))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    fn request(uri: &str, body: &'static str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passes_successful_response_through() {
        let response = router().oneshot(request("/echo", "ok")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_passes_rejections_through() {
        let response = router()
            .oneshot(request("/echo", "too long"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = router().oneshot(request("/missing", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
