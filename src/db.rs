use anyhow::Result;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{ConnectOptions, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Connection options shared by every pool.
///
/// PRAGMAs are set per connection so each pooled connection gets them:
/// - busy_timeout reduces SQLITE_BUSY errors
/// - synchronous=NORMAL is safe with WAL
/// - foreign_keys enables the cascading deletes of owned rows
/// - temp_store=memory speeds up temporary tables
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .busy_timeout(Duration::from_secs(5))
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .pragma("cache_size", "-20000")
        .pragma("temp_store", "memory")
        .log_statements(LevelFilter::Debug))
}

/// Create a read-only connection pool for concurrent reads
pub async fn create_read_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = connect_options(database_url)?.read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        "Created read-only pool with {} max connections",
        max_connections
    );

    Ok(pool)
}

/// Create the read-write pool.
///
/// Limited to 1 connection; every write and transaction goes through it.
/// Also creates the database file and switches it to WAL.
pub async fn create_write_pool(database_url: &str) -> Result<SqlitePool> {
    let options = connect_options(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    tracing::info!("Created read-write pool with 1 max connection");

    Ok(pool)
}

/// Create a single read-write pool, used by CLI commands
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = connect_options(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("Created pool with {} max connections", max_connections);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_applies_pragmas() {
        let pool = create_pool(":memory:", 1).await.unwrap();

        let journal_mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(journal_mode.0, "memory"); // WAL doesn't apply to :memory:

        let foreign_keys: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(foreign_keys.0, 1);

        let temp_store: (i32,) = sqlx::query_as("PRAGMA temp_store")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(temp_store.0, 2); // 2 = memory
    }

    #[tokio::test]
    async fn test_read_pool_rejects_writes() {
        let dir = temp_dir::TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.child("db.sqlite3").display());

        let write = create_write_pool(&url).await.unwrap();
        sqlx::query("CREATE TABLE note (id INTEGER PRIMARY KEY)")
            .execute(&write)
            .await
            .unwrap();

        let read = create_read_pool(&url, 2).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM note")
            .fetch_one(&read)
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        assert!(
            sqlx::query("INSERT INTO note (id) VALUES (1)")
                .execute(&read)
                .await
                .is_err()
        );
    }
}
