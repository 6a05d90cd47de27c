use std::fs::OpenOptions;
use std::path::Path;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use posewave_domain::shared::DomainError;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_path: &str) -> Result<Self, DomainError> {
        let path = Path::new(db_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::Infrastructure(format!("Failed to create DB directory: {}", e))
            })?;
        }

        if !path.exists() {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(path)
                .map_err(|e| {
                    DomainError::Infrastructure(format!("Failed to create DB file: {}", e))
                })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}", db_path))
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Pool connected to a throwaway in-memory database.
    pub async fn in_memory() -> Result<Self, DomainError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create the on-device cache schema if it is missing.
    pub async fn init_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
