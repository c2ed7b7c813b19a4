use serde::{Deserialize, Serialize};

use crate::entities::documents;

/// A stored document as returned by the ranker and the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i32,
    pub content: String,
    pub score: f64,
}

impl From<documents::Model> for Document {
    fn from(model: documents::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            score: model.score,
        }
    }
}

/// Document waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub content: String,
    pub score: f64,
}

impl NewDocument {
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

/// The fixed sample set used by `seed` and `POST /documents/seed`.
#[must_use]
pub fn sample_documents() -> Vec<NewDocument> {
    crate::constants::samples::DOCUMENTS
        .iter()
        .map(|&(content, score)| NewDocument::new(content, score))
        .collect()
}
