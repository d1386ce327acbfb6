// Public fallible APIs in this crate share one concrete error contract (`TagMeshError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod adjacency;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod models;
pub mod parse;
pub mod slug;
pub mod store;
pub mod summary;
pub mod taxonomy;
#[cfg(test)]
pub(crate) mod test_support;
pub mod visibility;

pub use client::TagMesh;
pub use config::EngineConfig;
pub use error::{ErrorPayload, Result, TagMeshError};
pub use models::{GraphEdge, GraphOptions, Item, ItemDocument, NeighborRecord, TagGraph, TagSummary};
