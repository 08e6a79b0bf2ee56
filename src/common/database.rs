// src/common/database.rs
//! SQLite pool construction

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// True for URLs whose data lives only as long as the connection
pub fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Connect to `database_url`, creating the file (and its directory) if needed
///
/// An in-memory database is private to a single connection, so the pool is
/// pinned to one connection that is never recycled.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(database_url) {
        info!("Using in-memory database; data is lost on shutdown");
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connect_options)
            .await?
    };

    Ok(pool)
}

/// Fresh in-memory database with the schema applied and no seed data
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = connect(DEFAULT_DATABASE_URL).await.unwrap();
    super::migrations::run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:agapay?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://data/agapay.db"));
    }

    #[tokio::test]
    async fn test_in_memory_pool_keeps_data() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO users (id, email, full_name, provider, provider_id, created_at) \
             VALUES ('U_TEST01', 'a@b.co', 'A', 'google', 'g-1', '2024-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
