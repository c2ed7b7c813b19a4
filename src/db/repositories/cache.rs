use crate::entities::{prelude::*, search_cache};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Serialized payload for `query`, ignoring entries created before `not_before`.
    pub async fn get(&self, query: &str, not_before: &str) -> Result<Option<String>> {
        let entry = SearchCache::find()
            .filter(search_cache::Column::Query.eq(query))
            .filter(search_cache::Column::CreatedAt.gte(not_before))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.results_json))
    }

    /// Inserts or replaces the entry for `query`.
    pub async fn upsert(&self, query: &str, results_json: &str, created_at: &str) -> Result<()> {
        let active_model = search_cache::ActiveModel {
            query: Set(query.to_string()),
            results_json: Set(results_json.to_string()),
            created_at: Set(created_at.to_string()),
            ..Default::default()
        };

        SearchCache::insert(active_model)
            .on_conflict(
                OnConflict::column(search_cache::Column::Query)
                    .update_columns([
                        search_cache::Column::ResultsJson,
                        search_cache::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete_created_before(&self, cutoff: &str) -> Result<u64> {
        let result = SearchCache::delete_many()
            .filter(search_cache::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(SearchCache::find().count(&self.conn).await?)
    }
}
