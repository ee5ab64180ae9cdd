use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored text fragment with its embedding.
///
/// Documents are immutable after creation; the store only ever appends them
/// or drops the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, assigned at creation, never reused.
    pub id: String,
    /// The stored fragment (non-empty).
    pub text: String,
    /// Fixed-length embedding; every document in a store shares one
    /// dimensionality.
    pub embedding: Vec<f32>,
    /// Opaque caller-supplied payload. The store never interprets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub(crate) fn new(text: String, embedding: Vec<f32>, metadata: Option<Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            embedding,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// A document paired with its similarity score for one query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: Document,
    /// Cosine similarity to the query (higher = closer).
    pub score: f32,
}
