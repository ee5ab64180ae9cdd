use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;

/// Retrieval settings, read from the `retrieval:` section of `config.yml`.
///
/// The API key for the embedding provider deliberately has no config-file
/// representation; it is read from the environment by the provider itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents returned per similarity query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Optional relevance floor; hits scoring below it are dropped.
    #[serde(default)]
    pub min_score: Option<f32>,
    /// Model identifier sent to the embedding endpoint.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Base URL of the OpenAI-compatible embedding endpoint.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: None,
            embedding_model: default_embedding_model(),
            provider_base_url: default_provider_base_url(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_provider_base_url() -> String {
    "https://api.openai.com".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    retrieval: Option<RetrievalConfig>,
}

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("OMURA_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    /// Loads the retrieval section, falling back to defaults when the file
    /// is missing. A file that exists but does not parse is reported so a
    /// typo cannot silently revert the deployment to defaults.
    pub fn load_retrieval_config(&self) -> RetrievalConfig {
        load_retrieval_section(&self.config_path())
    }
}

fn load_retrieval_section(path: &Path) -> RetrievalConfig {
    if !path.exists() {
        return RetrievalConfig::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!("Failed to read {}: {}", path.display(), err);
            return RetrievalConfig::default();
        }
    };

    match serde_yaml::from_str::<ConfigFile>(&contents) {
        Ok(file) => file.retrieval.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), err);
            RetrievalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_file_is_missing() {
        let config = load_retrieval_section(Path::new("/nonexistent/config.yml"));
        assert_eq!(config.top_k, 4);
        assert_eq!(config.min_score, None);
        assert_eq!(config.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn partial_section_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "retrieval:\n  top_k: 8\n  provider_base_url: http://localhost:1234\n",
        )
        .unwrap();

        let config = load_retrieval_section(&path);
        assert_eq!(config.top_k, 8);
        assert_eq!(config.provider_base_url, "http://localhost:1234");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "retrieval: [not, a, mapping").unwrap();

        let config = load_retrieval_section(&path);
        assert_eq!(config.top_k, 4);
    }
}
