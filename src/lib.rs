//! Embedded similarity-search document store for the Omura assistant.
//!
//! Stores text fragments with their embeddings, persists the collection as
//! a JSON snapshot across restarts, and answers "k most similar documents"
//! queries that ground the assistant's generated responses. The chat
//! transport, the language model, and the tools the assistant can invoke
//! all live with the host application; this crate only talks to the
//! embedding endpoint.
//!
//! Typical wiring at startup:
//!
//! ```text
//! AppPaths -> ConfigService -> RetrievalConfig
//!          -> OpenAiCompatProvider -> DocumentStore -> RetrievalService
//! ```
//!
//! The host constructs one `DocumentStore`, wraps it in a
//! `RetrievalService`, calls `initialize()` once, and passes the service
//! handle to its request pipeline.

pub mod core;
pub mod docstore;
pub mod embedding;
pub mod retrieval;

pub use crate::core::config::{AppPaths, ConfigService, RetrievalConfig};
pub use crate::core::errors::StoreError;
pub use crate::docstore::{Document, DocumentStore, SearchHit, DEFAULT_TOP_K};
pub use crate::embedding::{EmbeddingProvider, OpenAiCompatProvider};
pub use crate::retrieval::{Availability, RetrievalService, RetrievalStats};
