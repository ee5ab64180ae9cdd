//! Seed-once bootstrap policy.
//!
//! A freshly created store starts empty; the first run populates it with a
//! fixed corpus about the assistant itself so retrieval has something to
//! answer from before any user content arrives.

use serde_json::{json, Value};

use crate::core::errors::StoreError;
use crate::docstore::DocumentStore;

const SEED_TEXTS: &[&str] = &[
    "Omura is a chat assistant that augments its answers with documents retrieved from this knowledge base.",
    "Omura can evaluate arithmetic expressions when a question calls for calculation.",
    "Omura can report the current date and time when asked.",
    "Omura can search the web for information that is newer than its training data.",
    "Documents added to the knowledge base persist across restarts of the backend.",
    "When no stored document is relevant to a question, Omura answers from its own knowledge instead.",
];

fn seed_documents() -> (Vec<String>, Vec<Value>) {
    let texts = SEED_TEXTS.iter().map(|text| text.to_string()).collect();
    let metadatas = SEED_TEXTS
        .iter()
        .map(|_| json!({ "source": "bootstrap" }))
        .collect();
    (texts, metadatas)
}

/// Seeds the corpus if and only if the store is empty. Returns whether
/// seeding ran. A provider that cannot serve embeddings (missing
/// credentials, endpoint down) surfaces as `InitializationUnavailable` so
/// the host can continue with retrieval disabled instead of crashing.
pub(crate) async fn ensure_seeded(store: &DocumentStore) -> Result<bool, StoreError> {
    if !store.is_empty().await {
        return Ok(false);
    }

    if !store.provider().is_configured() {
        return Err(StoreError::InitializationUnavailable(format!(
            "embedding provider {} is not configured",
            store.provider().name()
        )));
    }

    let (texts, metadatas) = seed_documents();
    store
        .add_documents(texts, Some(metadatas))
        .await
        .map_err(|err| match err {
            StoreError::Provider(msg) => {
                StoreError::InitializationUnavailable(format!("seed embedding failed: {msg}"))
            }
            other => other,
        })?;

    Ok(true)
}
