//! SQLite Database - 数据库连接和迁移

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库连接 URL
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/saga.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    /// 内存数据库：每个连接各自独立，因此只允许一个连接
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
///
/// 每个连接都会设置：
/// - WAL 模式，允许并发读写
/// - busy_timeout=5000ms，遇到锁时等待而不是立即失败
/// - 外键约束开启，级联删除依赖它
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        url = %config.database_url,
        max_connections = config.max_connections,
        "SQLite pool created with WAL mode and foreign keys"
    );

    Ok(pool)
}

/// 建表语句，按依赖顺序排列
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        summary TEXT,
        status TEXT NOT NULL DEFAULT 'ongoing',
        cover_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS volumes (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        title TEXT NOT NULL,
        order_index INTEGER NOT NULL,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        UNIQUE (book_id, order_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chapters (
        id TEXT PRIMARY KEY,
        volume_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        word_count INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'draft',
        order_index INTEGER NOT NULL,
        FOREIGN KEY (volume_id) REFERENCES volumes(id) ON DELETE CASCADE,
        UNIQUE (volume_id, order_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entities (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        description TEXT,
        avatar_url TEXT,
        attributes TEXT NOT NULL DEFAULT '{}',
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS eras (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        order_index INTEGER NOT NULL,
        start_absolute_tick INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS timeline_events (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        era_id TEXT,
        title TEXT NOT NULL,
        description TEXT,
        year_in_era INTEGER,
        month_in_era INTEGER,
        day_in_era INTEGER,
        absolute_tick INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (era_id) REFERENCES eras(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_participants (
        id TEXT PRIMARY KEY,
        event_id TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'participant',
        FOREIGN KEY (event_id) REFERENCES timeline_events(id) ON DELETE CASCADE,
        FOREIGN KEY (entity_id) REFERENCES entities(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS relationships (
        id TEXT PRIMARY KEY,
        book_id TEXT NOT NULL,
        entity_a_id TEXT NOT NULL,
        entity_b_id TEXT NOT NULL,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (entity_a_id) REFERENCES entities(id) ON DELETE CASCADE,
        FOREIGN KEY (entity_b_id) REFERENCES entities(id) ON DELETE CASCADE,
        UNIQUE (book_id, entity_a_id, entity_b_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS relationship_snapshots (
        id TEXT PRIMARY KEY,
        relationship_id TEXT NOT NULL,
        start_tick INTEGER NOT NULL DEFAULT 0,
        relation_type TEXT NOT NULL,
        label TEXT,
        FOREIGN KEY (relationship_id) REFERENCES relationships(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_volumes_book_id ON volumes(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_chapters_volume_id ON chapters(volume_id)",
    "CREATE INDEX IF NOT EXISTS idx_entities_book_id ON entities(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_eras_book_id ON eras(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_events_book_tick ON timeline_events(book_id, absolute_tick)",
    "CREATE INDEX IF NOT EXISTS idx_event_participants_event_id ON event_participants(event_id)",
    "CREATE INDEX IF NOT EXISTS idx_event_participants_entity_id ON event_participants(entity_id)",
    "CREATE INDEX IF NOT EXISTS idx_relationships_entity_b_id ON relationships(entity_b_id)",
    "CREATE INDEX IF NOT EXISTS idx_relationship_snapshots_relationship_id ON relationship_snapshots(relationship_id)",
];

/// 运行数据库迁移（幂等）
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(statements = SCHEMA.len(), "Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_in_memory_db() {
        let config = DatabaseConfig::in_memory();
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        // 迁移可重复执行
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_backed_db() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path().join("saga.db"));
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_database_url_from_path() {
        let config = DatabaseConfig::new("/tmp/saga.db");
        assert_eq!(config.database_url, "sqlite:/tmp/saga.db?mode=rwc");
    }
}
