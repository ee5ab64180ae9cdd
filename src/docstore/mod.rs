//! The embedded similarity-search document store.
//!
//! Holds text fragments with their embeddings, persists the collection as a
//! JSON snapshot, and answers top-k cosine-similarity queries against a
//! constructor-injected embedding provider.

mod document;
mod persistence;
mod similarity;
mod store;

pub use document::{Document, SearchHit};
pub use similarity::cosine_similarity;
pub use store::{DocumentStore, DEFAULT_TOP_K};
