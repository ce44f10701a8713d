//! Error types for the grounded domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external boundary has its own sub-enum.

use thiserror::Error;

/// The top-level error type for all grounded operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input (e.g. a zero result limit, a blank question).
    /// Raised before any provider call is made.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // --- Embedding provider errors ---
    #[error("Embedding provider error: {0}")]
    Embedding(#[source] ProviderError),

    // --- Search provider errors ---
    #[error("Search provider error: {0}")]
    Search(#[source] SearchError),

    // --- Chat completion provider errors ---
    #[error("Chat provider error: {0}")]
    Chat(#[source] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Boundary errors ---

/// Failures from a model provider (embeddings or chat completions).
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from the document search index.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by search service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response from search service: {0}")]
    InvalidResponse(String),
}
