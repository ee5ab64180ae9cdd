use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::EmbeddingProvider;
use crate::core::config::RetrievalConfig;
use crate::core::errors::StoreError;

const API_KEY_ENV: &str = "OMURA_EMBEDDINGS_API_KEY";
const HOSTED_BASE_URL: &str = "https://api.openai.com";

/// Embedding provider speaking the OpenAI `/v1/embeddings` wire format.
///
/// Works against the hosted endpoint (bearer auth required) or any local
/// OpenAI-compatible server such as LM Studio (no auth).
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: Client::new(),
        }
    }

    /// Builds a provider from config, reading the API key from the
    /// `OMURA_EMBEDDINGS_API_KEY` environment variable.
    pub fn from_config(config: &RetrievalConfig) -> Self {
        let api_key = env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        Self::new(
            config.provider_base_url.clone(),
            config.embedding_model.clone(),
            api_key,
        )
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn is_configured(&self) -> bool {
        // Local endpoints run unauthenticated; only the hosted default
        // requires a key.
        self.api_key.is_some() || self.base_url != HOSTED_BASE_URL
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await.map_err(StoreError::provider)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(StoreError::Provider(format!(
                "embeddings request failed ({}): {}",
                status, text
            )));
        }

        let payload: EmbeddingsResponse = res.json().await.map_err(StoreError::provider)?;

        let mut items = payload.data;
        items.sort_by_key(|item| item.index);

        if items.len() != inputs.len() {
            return Err(StoreError::Provider(format!(
                "embedding count mismatch: sent {} inputs, got {} vectors",
                inputs.len(),
                items.len()
            )));
        }

        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_endpoint_requires_a_key() {
        let provider =
            OpenAiCompatProvider::new(HOSTED_BASE_URL.to_string(), "embed".to_string(), None);
        assert!(!provider.is_configured());

        let provider = OpenAiCompatProvider::new(
            HOSTED_BASE_URL.to_string(),
            "embed".to_string(),
            Some("sk-test".to_string()),
        );
        assert!(provider.is_configured());
    }

    #[test]
    fn local_endpoint_is_configured_without_a_key() {
        let provider = OpenAiCompatProvider::new(
            "http://localhost:1234/".to_string(),
            "embed".to_string(),
            None,
        );
        assert!(provider.is_configured());
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
