//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct, the only owner of reads and
//! writes against the `items` table. Item operations live in `items.rs`.

mod items;

use crate::domain::ItemId;
use sqlx::sqlite::SqlitePool;
use thiserror::Error;

/// Typed outcome of a failed repository operation.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Item {0} not found")]
    NotFound(ItemId),
    #[error("Item with title '{title}' already exists")]
    Conflict { title: String },
    #[error("Invalid stored item data: {0}")]
    InvalidData(String),
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Check that the store answers a trivial query.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection. Pending operations finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
