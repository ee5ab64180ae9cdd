//! Embedding provider boundary.
//!
//! The document store consumes embeddings as an opaque capability behind
//! `EmbeddingProvider`. The batch call is the primary entry point; the
//! single-text form is a default method over it so every implementation
//! batches the same way.

mod openai_compat;

use async_trait::async_trait;

use crate::core::errors::StoreError;

pub use openai_compat::OpenAiCompatProvider;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name for logging (e.g. "openai-compat").
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to serve requests (e.g.
    /// credentials). Checked once at bootstrap; a `false` here disables
    /// retrieval for the process lifetime rather than failing every call.
    fn is_configured(&self) -> bool {
        true
    }

    /// Embed a batch of texts. Must return one vector per input, in input
    /// order.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;

    /// Embed a single text via the batch entry point.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, StoreError> {
        let inputs = [input.to_string()];
        let mut vectors = self.embed_batch(&inputs).await?;
        if vectors.len() != 1 {
            return Err(StoreError::Provider(format!(
                "expected 1 embedding, got {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }
}
