//! Saga - 长篇小说创作与全书备份服务

use std::sync::Arc;

use saga::config::{load_config, print_config};
use saga::infrastructure::http::{AppState, HttpServer, RequestLimits};
use saga::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
use saga::infrastructure::SqliteBookStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},saga={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Saga - 长篇小说创作与全书备份服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let store = Arc::new(SqliteBookStore::new(pool));
    let limits = RequestLimits {
        max_snapshot_bytes: config.backup.max_snapshot_bytes,
        max_upload_bytes: config.import.max_upload_bytes,
    };
    let state = AppState::new(store, config.backup.copy_suffix.clone(), limits);

    let server = HttpServer::new(config.server.addr(), state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
