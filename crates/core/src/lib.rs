//! # Grounded Core
//!
//! Domain types, traits, and error definitions for the grounded RAG chat
//! orchestrator. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external seams — the model provider (embeddings + chat
//! completions) and the document index — are defined as traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping providers via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SearchError};
pub use message::{Conversation, Message, Role};
pub use provider::{
    CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse, Provider, Usage,
};
pub use search::{SearchBackend, SearchHit, SearchMode, SearchRequest, VectorQuery};
