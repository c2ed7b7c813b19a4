use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{documents, prelude::*};
use crate::models::document::{Document, NewDocument};

pub struct DocumentRepository {
    conn: DatabaseConnection,
}

impl DocumentRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<Document>> {
        let rows = Documents::find()
            .order_by_asc(documents::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    /// Highest-scoring documents at or above `threshold`, ties in insertion order.
    pub async fn top_scoring(&self, threshold: f64, limit: u64) -> Result<Vec<Document>> {
        let rows = Documents::find()
            .filter(documents::Column::Score.gte(threshold))
            .order_by_desc(documents::Column::Score)
            .order_by_asc(documents::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    pub async fn insert_many(&self, docs: &[NewDocument]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }

        let models = docs.iter().map(|doc| documents::ActiveModel {
            content: Set(doc.content.clone()),
            score: Set(doc.score),
            ..Default::default()
        });

        Documents::insert_many(models).exec(&self.conn).await?;
        Ok(docs.len())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Documents::find().count(&self.conn).await?)
    }
}
