//! HTTP Layer - RESTful API
//!
//! 所有业务响应使用 `{errno, error, data}` 包装，HTTP 状态码恒为 200

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::HttpServer;
pub use state::{AppState, RequestLimits};
