//! Retrieval façade for the chat pipeline.
//!
//! The chat side of the system hands a user turn to `RetrievalService` and
//! folds whatever comes back into its prompt; prompt construction itself
//! lives with the caller, not here.

mod bootstrap;
mod service;

pub use service::{Availability, RetrievalService, RetrievalStats};
