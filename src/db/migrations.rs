//! Database initialization and schema setup.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Pool size used when the caller has no configured value.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Initialize the SQLite database with schema and pragmas.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    init_db_with(db_path, DEFAULT_MAX_CONNECTIONS).await
}

/// Initialize the SQLite database with an explicit pool size.
pub async fn init_db_with(db_path: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    ensure_schema(&pool).await?;

    info!(db_path, max_connections, "Database initialized");
    Ok(pool)
}

/// Create the items table and its indexes if they do not exist.
///
/// Safe to run on every start; existing tables are never altered.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Ensuring items schema...");
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    info!("Schema ready");
    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    tracing::debug!(%journal_mode, "SQLite journal mode");

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn db_path(temp_dir: &TempDir) -> String {
        temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string()
    }

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = db_path(&temp_dir);

        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());

        let result: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_init_db_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested/dir/items.db")
            .to_string_lossy()
            .to_string();

        init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());
    }

    #[tokio::test]
    async fn test_schema_creates_items_table_and_indexes() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        let result: (String,) =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name='items'")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert_eq!(result.0, "items");

        let indexes: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='index' AND tbl_name='items' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("query failed");
        let names: Vec<&str> = indexes.iter().map(|r| r.0.as_str()).collect();
        assert!(names.contains(&"idx_items_title"));
        assert!(names.contains(&"uq_items_title"));
    }

    #[tokio::test]
    async fn test_schema_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        sqlx::query("INSERT INTO items (title) VALUES ('kept')")
            .execute(&pool)
            .await
            .unwrap();

        ensure_schema(&pool)
            .await
            .expect("second schema run failed");

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_column_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        sqlx::query("INSERT INTO items (title) VALUES ('defaults')")
            .execute(&pool)
            .await
            .unwrap();

        let (is_active, created_at): (i64, String) =
            sqlx::query_as("SELECT is_active, created_at FROM items WHERE title = 'defaults'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(is_active, 1);
        assert!(!created_at.is_empty());
    }

    #[tokio::test]
    async fn test_pragmas_configured() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        // `journal_mode=WAL` is best-effort; SQLite can fall back depending on environment.
        assert!(
            matches!(result.0.as_str(), "wal" | "delete"),
            "unexpected journal_mode: {}",
            result.0
        );
    }
}
