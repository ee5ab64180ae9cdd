//! JSON snapshot persistence for the document collection.
//!
//! Every successful mutation rewrites the whole collection; loading the
//! output of a save reproduces an equal collection (ids, texts, embeddings
//! at full precision, metadata). Whole-snapshot writes are a simplicity
//! trade-off that holds at the store's target scale.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::errors::StoreError;

use super::document::Document;

/// Loads a persisted collection. A missing file is an empty store; a file
/// that exists but cannot be read or parsed is surfaced as a persistence
/// error, never silently replaced with an empty collection.
pub(crate) async fn load_snapshot(path: &Path) -> Result<Vec<Document>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(StoreError::Persistence(format!(
                "failed to read {}: {}",
                path.display(),
                err
            )))
        }
    };

    let documents: Vec<Document> = serde_json::from_slice(&bytes).map_err(|err| {
        StoreError::Persistence(format!("malformed snapshot {}: {}", path.display(), err))
    })?;

    validate_collection(&documents)?;
    Ok(documents)
}

/// Writes the whole collection, replacing prior content. The snapshot goes
/// to a sibling temp file first and is renamed into place, so an interrupted
/// write leaves the previous snapshot intact.
pub(crate) async fn save_snapshot(path: &Path, documents: &[Document]) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(documents).map_err(StoreError::persistence)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(StoreError::persistence)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    tokio::fs::write(&tmp, &json)
        .await
        .map_err(StoreError::persistence)?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(StoreError::persistence)?;

    Ok(())
}

/// Store invariants that make a persisted collection corrupt when violated:
/// duplicate ids or mixed embedding dimensionality.
fn validate_collection(documents: &[Document]) -> Result<(), StoreError> {
    let mut ids = HashSet::new();
    let mut dimension: Option<usize> = None;

    for document in documents {
        if !ids.insert(document.id.as_str()) {
            return Err(StoreError::Persistence(format!(
                "corrupt snapshot: duplicate document id {}",
                document.id
            )));
        }

        match dimension {
            None => dimension = Some(document.embedding.len()),
            Some(expected) if expected != document.embedding.len() => {
                return Err(StoreError::Persistence(format!(
                    "corrupt snapshot: document {} has dimension {}, store has {}",
                    document.id,
                    document.embedding.len(),
                    expected
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_documents() -> Vec<Document> {
        vec![
            Document::new(
                "cats are mammals".to_string(),
                vec![0.123_456_79, -0.5, 1.0e-7],
                Some(json!({ "source": "seed", "rank": 1 })),
            ),
            Document::new("rockets are vehicles".to_string(), vec![0.0, 1.0, 0.25], None),
        ]
    }

    #[tokio::test]
    async fn round_trip_reproduces_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");

        let original = sample_documents();
        save_snapshot(&path, &original).await.unwrap();
        let loaded = load_snapshot(&path).await.unwrap();

        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_snapshot(&dir.path().join("documents.json")).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn malformed_snapshot_is_an_error_not_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        tokio::fs::write(&path, b"{ not json ]").await.unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn mixed_dimensions_are_rejected_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");

        let mut documents = sample_documents();
        documents[1].embedding = vec![1.0];
        let json = serde_json::to_vec(&documents).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");

        let mut documents = sample_documents();
        documents[1].id = documents[0].id.clone();
        let json = serde_json::to_vec(&documents).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let err = load_snapshot(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn save_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");

        save_snapshot(&path, &sample_documents()).await.unwrap();
        save_snapshot(&path, &[]).await.unwrap();

        let loaded = load_snapshot(&path).await.unwrap();
        assert!(loaded.is_empty());
    }
}
