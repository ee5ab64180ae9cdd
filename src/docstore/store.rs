use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::core::config::AppPaths;
use crate::core::errors::StoreError;
use crate::embedding::EmbeddingProvider;

use super::document::{Document, SearchHit};
use super::{persistence, similarity};

/// Documents returned per query when the caller does not choose a k.
pub const DEFAULT_TOP_K: usize = 4;

/// Append-only document store with snapshot persistence.
///
/// One instance owns one snapshot file. Operations are not safe against
/// concurrent writers in separate processes; within a process the internal
/// lock serializes mutations, and reads observe either the pre- or
/// post-write collection (each query works on a stable clone).
pub struct DocumentStore {
    documents: RwLock<Vec<Document>>,
    snapshot_path: PathBuf,
    provider: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("snapshot_path", &self.snapshot_path)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    pub async fn new(
        paths: &AppPaths,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, StoreError> {
        Self::with_path(paths.docstore_path.clone(), provider).await
    }

    /// Opens a store over an explicit snapshot path. Loading a malformed
    /// snapshot fails construction; silently starting empty would mask data
    /// loss.
    pub async fn with_path(
        snapshot_path: PathBuf,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, StoreError> {
        let documents = persistence::load_snapshot(&snapshot_path).await?;
        Ok(Self {
            documents: RwLock::new(documents),
            snapshot_path,
            provider,
        })
    }

    pub(crate) fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Embedding dimensionality of the collection, `None` while empty.
    pub async fn dimension(&self) -> Option<usize> {
        self.documents
            .read()
            .await
            .first()
            .map(|document| document.embedding.len())
    }

    /// Embeds `text` and appends it as a new document, persisting the
    /// updated collection before returning.
    pub async fn add_document(
        &self,
        text: &str,
        metadata: Option<Value>,
    ) -> Result<(), StoreError> {
        self.add_documents(vec![text.to_string()], metadata.map(|value| vec![value]))
            .await
    }

    /// Batch append. Embeddings are obtained in a single provider call and
    /// the collection is persisted once for the whole batch: either every
    /// document in the batch becomes visible, or none does.
    pub async fn add_documents(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Value>>,
    ) -> Result<(), StoreError> {
        // Validation comes before any I/O.
        if texts.is_empty() {
            return Err(StoreError::Validation(
                "texts must be a non-empty collection".to_string(),
            ));
        }
        if texts.iter().any(|text| text.trim().is_empty()) {
            return Err(StoreError::Validation(
                "document text must not be empty".to_string(),
            ));
        }
        if let Some(metadatas) = &metadatas {
            if metadatas.len() != texts.len() {
                return Err(StoreError::Validation(format!(
                    "metadata count {} does not match text count {}",
                    metadatas.len(),
                    texts.len()
                )));
            }
        }

        // A provider failure here surfaces to the caller; nothing has been
        // appended or persisted yet.
        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(StoreError::Provider(format!(
                "provider returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let mut documents = self.documents.write().await;

        let mut dimension = documents.first().map(|document| document.embedding.len());
        for embedding in &embeddings {
            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(StoreError::Validation(format!(
                        "embedding dimension {} does not match store dimension {}",
                        embedding.len(),
                        expected
                    )));
                }
                _ => {}
            }
        }

        let prior_len = documents.len();
        let metadatas = metadatas
            .map(|values| values.into_iter().map(Some).collect::<Vec<_>>())
            .unwrap_or_else(|| vec![None; texts.len()]);

        for ((text, embedding), metadata) in texts.into_iter().zip(embeddings).zip(metadatas) {
            documents.push(Document::new(text, embedding, metadata));
        }

        if let Err(err) = persistence::save_snapshot(&self.snapshot_path, &documents).await {
            // Roll the batch back so memory and disk stay in agreement.
            documents.truncate(prior_len);
            return Err(err);
        }

        Ok(())
    }

    /// Top-`k` documents by cosine similarity to `query`, descending.
    ///
    /// Retrieval is best-effort: an embedding failure degrades to an empty
    /// result instead of propagating, because missing context must never
    /// abort the caller's primary request. An empty store returns empty
    /// without calling the provider at all.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if k == 0 {
            return Vec::new();
        }

        let snapshot: Vec<Document> = {
            let documents = self.documents.read().await;
            if documents.is_empty() {
                return Vec::new();
            }
            documents.clone()
        };

        let query_embedding = match self.provider.embed(query).await {
            Ok(embedding) => embedding,
            Err(err) => {
                tracing::warn!("similarity search degraded to empty result: {}", err);
                return Vec::new();
            }
        };

        similarity::rank_by_similarity(&query_embedding, &snapshot, k)
    }

    /// `similarity_search` with the default k.
    pub async fn similarity_search_default(&self, query: &str) -> Vec<SearchHit> {
        self.similarity_search(query, DEFAULT_TOP_K).await
    }

    /// Empties the collection and persists the empty snapshot, so a restart
    /// sees zero documents.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        documents.clear();
        persistence::save_snapshot(&self.snapshot_path, &documents).await
    }
}
