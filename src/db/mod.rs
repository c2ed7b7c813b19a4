use crate::models::document::{Document, NewDocument};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Statement,
    TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::prelude::*;

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

/// Canonical timestamp encoding for stored rows.
///
/// Fixed precision and a `Z` suffix keep lexical and chronological order equal,
/// which the cache eviction query relies on.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Rows removed by [`Store::clear_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedRows {
    pub documents: u64,
    pub cache_entries: u64,
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn document_repo(&self) -> repositories::document::DocumentRepository {
        repositories::document::DocumentRepository::new(self.conn.clone())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_user_id(user_id).await
    }

    pub async fn create_user(&self, user_id: &str) -> Result<bool> {
        self.user_repo().create_with_first_request(user_id).await
    }

    pub async fn increment_request_count(&self, user_id: &str, limit: i32) -> Result<bool> {
        self.user_repo().increment_below(user_id, limit).await
    }

    // Documents

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        self.document_repo().list_all().await
    }

    pub async fn top_documents(&self, threshold: f64, limit: u64) -> Result<Vec<Document>> {
        self.document_repo().top_scoring(threshold, limit).await
    }

    pub async fn add_documents(&self, docs: &[NewDocument]) -> Result<usize> {
        self.document_repo().insert_many(docs).await
    }

    pub async fn document_count(&self) -> Result<u64> {
        self.document_repo().count().await
    }

    // Search cache

    pub async fn get_cached_search(&self, query: &str, not_before: &str) -> Result<Option<String>> {
        self.cache_repo().get(query, not_before).await
    }

    pub async fn cache_search(&self, query: &str, results_json: &str, created_at: &str) -> Result<()> {
        self.cache_repo()
            .upsert(query, results_json, created_at)
            .await
    }

    pub async fn delete_cache_created_before(&self, cutoff: &str) -> Result<u64> {
        self.cache_repo().delete_created_before(cutoff).await
    }

    pub async fn cache_entry_count(&self) -> Result<u64> {
        self.cache_repo().count().await
    }

    /// Wipes every document together with the cached results derived from them.
    ///
    /// Runs in one transaction; an early return drops it, which rolls back and
    /// hands the connection back to the pool.
    pub async fn clear_database(&self) -> Result<ClearedRows> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to start transaction")?;

        let documents = Documents::delete_many()
            .exec(&txn)
            .await
            .context("Failed to delete documents")?
            .rows_affected;

        let cache_entries = SearchCache::delete_many()
            .exec(&txn)
            .await
            .context("Failed to delete cached searches")?
            .rows_affected;

        txn.commit().await.context("Failed to commit clear")?;

        Ok(ClearedRows {
            documents,
            cache_entries,
        })
    }
}
