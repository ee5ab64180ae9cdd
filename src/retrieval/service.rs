use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::core::config::RetrievalConfig;
use crate::core::errors::StoreError;
use crate::docstore::{DocumentStore, SearchHit};

use super::bootstrap;

/// Whether retrieval can serve context, decided exactly once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Uninitialized,
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalStats {
    pub availability: Availability,
    pub documents: usize,
    pub top_k: usize,
}

/// Caller-facing retrieval façade.
///
/// Owns the bootstrap-once policy and the availability decision. When
/// initialization fails, every subsequent search returns empty without
/// retrying — one decision per process, no retry storms.
pub struct RetrievalService {
    store: Arc<DocumentStore>,
    availability: OnceLock<bool>,
    top_k: usize,
    min_score: Option<f32>,
}

impl RetrievalService {
    pub fn new(store: Arc<DocumentStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            availability: OnceLock::new(),
            top_k: config.top_k,
            min_score: config.min_score,
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn availability(&self) -> Availability {
        match self.availability.get() {
            None => Availability::Uninitialized,
            Some(true) => Availability::Available,
            Some(false) => Availability::Unavailable,
        }
    }

    /// Runs the bootstrap policy and fixes the availability decision for
    /// the process lifetime. Calling again returns the recorded decision
    /// without re-running anything.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if let Some(available) = self.availability.get() {
            return if *available {
                Ok(())
            } else {
                Err(StoreError::InitializationUnavailable(
                    "retrieval was disabled at startup".to_string(),
                ))
            };
        }

        match bootstrap::ensure_seeded(&self.store).await {
            Ok(seeded) => {
                let _ = self.availability.set(true);
                if seeded {
                    tracing::info!(
                        "seeded bootstrap corpus ({} documents)",
                        self.store.count().await
                    );
                }
                Ok(())
            }
            Err(err) => {
                let _ = self.availability.set(false);
                tracing::warn!("retrieval disabled for this process: {}", err);
                Err(err)
            }
        }
    }

    /// Top-k retrieval for a user turn. Empty unless initialization
    /// succeeded.
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        if self.availability.get().copied() != Some(true) {
            tracing::debug!("retrieval not available; returning no context");
            return Vec::new();
        }

        let hits = self.store.similarity_search(query, self.top_k).await;
        match self.min_score {
            Some(min) => hits.into_iter().filter(|hit| hit.score >= min).collect(),
            None => hits,
        }
    }

    pub async fn stats(&self) -> RetrievalStats {
        RetrievalStats {
            availability: self.availability(),
            documents: self.store.count().await,
            top_k: self.top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::EmbeddingProvider;

    /// Deterministic provider: any text maps to a non-zero 3-vector.
    struct HashingProvider {
        configured: bool,
        calls: AtomicUsize,
    }

    impl HashingProvider {
        fn new(configured: bool) -> Arc<Self> {
            Arc::new(Self {
                configured,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn vectorize(text: &str) -> Vec<f32> {
            let bytes = text.as_bytes();
            let sum: f32 = bytes.iter().map(|b| *b as f32).sum();
            vec![sum, bytes.len() as f32, 1.0]
        }
    }

    #[async_trait]
    impl EmbeddingProvider for HashingProvider {
        fn name(&self) -> &str {
            "hashing"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(inputs.iter().map(|text| Self::vectorize(text)).collect())
        }
    }

    async fn service_with(
        provider: Arc<HashingProvider>,
        config: RetrievalConfig,
    ) -> (RetrievalService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        let store = Arc::new(DocumentStore::with_path(path, provider).await.unwrap());
        (RetrievalService::new(store, &config), dir)
    }

    #[tokio::test]
    async fn initialize_seeds_an_empty_store_exactly_once() {
        let provider = HashingProvider::new(true);
        let (service, _dir) = service_with(provider.clone(), RetrievalConfig::default()).await;

        assert_eq!(service.availability(), Availability::Uninitialized);
        service.initialize().await.unwrap();

        let seeded_count = service.store().count().await;
        assert!(seeded_count > 0);
        assert_eq!(service.availability(), Availability::Available);

        // A second initialize is a no-op on the recorded decision.
        service.initialize().await.unwrap();
        assert_eq!(service.store().count().await, seeded_count);
    }

    #[tokio::test]
    async fn initialize_skips_seeding_a_populated_store() {
        let provider = HashingProvider::new(true);
        let (service, _dir) = service_with(provider, RetrievalConfig::default()).await;

        service
            .store()
            .add_document("user supplied knowledge", None)
            .await
            .unwrap();
        service.initialize().await.unwrap();

        assert_eq!(service.store().count().await, 1);
    }

    #[tokio::test]
    async fn unconfigured_provider_disables_retrieval_for_good() {
        let provider = HashingProvider::new(false);
        let (service, _dir) = service_with(provider.clone(), RetrievalConfig::default()).await;

        let err = service.initialize().await.unwrap_err();
        assert!(matches!(err, StoreError::InitializationUnavailable(_)));
        assert_eq!(service.availability(), Availability::Unavailable);

        // Searches return empty without touching the provider, and a later
        // initialize does not retry.
        assert!(service.search("anything").await.is_empty());
        assert_eq!(provider.calls(), 0);
        assert!(service.initialize().await.is_err());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn search_before_initialize_returns_no_context() {
        let provider = HashingProvider::new(true);
        let (service, _dir) = service_with(provider.clone(), RetrievalConfig::default()).await;

        assert!(service.search("anything").await.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn search_respects_top_k_and_min_score() {
        let provider = HashingProvider::new(true);
        let config = RetrievalConfig {
            top_k: 2,
            min_score: Some(-1.0),
            ..RetrievalConfig::default()
        };
        let (service, _dir) = service_with(provider, config).await;

        service.initialize().await.unwrap();
        let hits = service.search("what can you do?").await;

        assert!(hits.len() <= 2);
        assert!(!hits.is_empty());

        let stats = service.stats().await;
        assert_eq!(stats.availability, Availability::Available);
        assert_eq!(stats.top_k, 2);
        assert_eq!(stats.documents, service.store().count().await);
    }
}
