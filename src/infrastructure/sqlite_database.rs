// SQLite store, used by the test suites and for local runs without MySQL

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult};
use sqlx::QueryBuilder;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::core::{PageFilter, Pagination};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{
    contains_pattern, impl_page_store, DatabaseBackend, PageStore, COMMENT_COLUMNS, PAGE_COLUMNS,
    POST_COLUMNS, USER_COLUMNS,
};
use crate::models::{
    current_time_millis, CommentRow, PageRow, PostRow, ScrapedPage, ScrapedUser, UserRow,
};

pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            // Every in-memory connection is its own database, so pin exactly one.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to SQLite: {}", e))
        })?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied.
    pub async fn new_in_memory() -> AppResult<Self> {
        let db = Self::connect("sqlite::memory:", 1).await?;
        db.init().await?;
        Ok(db)
    }
}

fn inserted_id(result: &SqliteQueryResult, _what: &str) -> AppResult<i64> {
    Ok(result.last_insert_rowid())
}

impl_page_store!(SqliteDatabase, Sqlite, DatabaseBackend::Sqlite, inserted_id);
