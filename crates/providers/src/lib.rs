//! Provider adapters for grounded.
//!
//! The model provider implements `grounded_core::Provider`; the document
//! index implements `grounded_core::SearchBackend`. Both are built from
//! `grounded_config::AppConfig` at startup.

pub mod azure_search;
pub mod openai_compat;

pub use azure_search::AzureSearchBackend;
pub use openai_compat::{prepare_embedding_input, OpenAiCompatProvider};

use grounded_config::AppConfig;
use std::sync::Arc;

/// Build the chat provider from configuration.
///
/// Callers must have validated the config first; missing values here are a
/// programming error, reported as `NotConfigured` rather than a panic.
pub fn chat_provider_from_config(
    config: &AppConfig,
) -> Result<Arc<OpenAiCompatProvider>, grounded_core::ProviderError> {
    let (url, key) = match (&config.chat.api_url, &config.chat.api_key) {
        (Some(url), Some(key)) => (url.clone(), key.clone()),
        _ => {
            return Err(grounded_core::ProviderError::NotConfigured(
                "chat provider endpoint or key missing".into(),
            ))
        }
    };
    Ok(Arc::new(OpenAiCompatProvider::new("chat", url, key)))
}

/// Build the embedding provider from configuration, falling back to the
/// chat endpoint and key when no dedicated embedding endpoint is set.
pub fn embedding_provider_from_config(
    config: &AppConfig,
) -> Result<Arc<OpenAiCompatProvider>, grounded_core::ProviderError> {
    let (url, key) = match (config.embedding_api_url(), config.embedding_api_key()) {
        (Some(url), Some(key)) => (url.to_string(), key.to_string()),
        _ => {
            return Err(grounded_core::ProviderError::NotConfigured(
                "embedding provider endpoint or key missing".into(),
            ))
        }
    };
    Ok(Arc::new(OpenAiCompatProvider::new("embedding", url, key)))
}

/// Build the search backend from configuration.
pub fn search_backend_from_config(
    config: &AppConfig,
) -> Result<Arc<AzureSearchBackend>, grounded_core::SearchError> {
    let (endpoint, key, index) = match (
        &config.search.endpoint,
        &config.search.api_key,
        &config.search.index,
    ) {
        (Some(endpoint), Some(key), Some(index)) => {
            (endpoint.clone(), key.clone(), index.clone())
        }
        _ => {
            return Err(grounded_core::SearchError::InvalidResponse(
                "search endpoint, key, or index missing from configuration".into(),
            ))
        }
    };
    Ok(Arc::new(AzureSearchBackend::new(
        endpoint,
        index,
        key,
        config.search.api_version.clone(),
    )))
}
