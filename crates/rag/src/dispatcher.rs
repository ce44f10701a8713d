//! Search dispatch — decides the request shape per search mode.
//!
//! Lexical sends raw query text and no vector; vector embeds the query and
//! sends no text; hybrid sends both and leaves result fusion to the
//! provider. The limit is validated here, before any network call.

use grounded_core::error::{Error, Result};
use grounded_core::provider::{EmbeddingRequest, Provider};
use grounded_core::search::{SearchBackend, SearchHit, SearchMode, SearchRequest, VectorQuery};
use grounded_providers::prepare_embedding_input;
use std::sync::Arc;
use tracing::{debug, warn};

/// Issues the correctly-shaped search request for a query and mode.
pub struct SearchDispatcher {
    backend: Arc<dyn SearchBackend>,
    embedder: Arc<dyn Provider>,
    embedding_model: String,
    input_limit: usize,
    vector_field: String,
}

impl SearchDispatcher {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        embedder: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        input_limit: usize,
        vector_field: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            embedder,
            embedding_model: embedding_model.into(),
            input_limit,
            vector_field: vector_field.into(),
        }
    }

    /// Execute a search for `query` under `mode`, returning hits in
    /// provider order.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(Error::InvalidParameter(
                "top_k must be at least 1".into(),
            ));
        }

        let vector = match mode {
            SearchMode::Lexical => None,
            SearchMode::Vector | SearchMode::Hybrid => Some(VectorQuery {
                vector: self.embed_query(query).await?,
                k: top_k,
                field: self.vector_field.clone(),
            }),
        };

        let text = match mode {
            SearchMode::Vector => None,
            SearchMode::Lexical | SearchMode::Hybrid => Some(query.to_string()),
        };

        let request = SearchRequest {
            text,
            vector,
            top: top_k,
        };

        debug!(%mode, top_k, "Dispatching search");

        let hits = self
            .backend
            .search(request)
            .await
            .map_err(Error::Search)?;

        debug!(hits = hits.len(), "Search returned");
        Ok(hits)
    }

    /// Embed the query, normalizing and truncating its text first.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let (input, truncated) = prepare_embedding_input(query, self.input_limit);
        if truncated {
            warn!(
                limit = self.input_limit,
                "Query text exceeded the embedding input limit, truncating"
            );
        }

        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![input],
            })
            .await
            .map_err(Error::Embedding)?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Embedding(grounded_core::ProviderError::ApiError {
                    status_code: 200,
                    message: "Embedding response contained no vectors".into(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockProvider, MockSearchBackend};

    fn dispatcher(
        backend: Arc<MockSearchBackend>,
        embedder: Arc<MockProvider>,
    ) -> SearchDispatcher {
        SearchDispatcher::new(backend, embedder, "embed-model", 7000, "text_vector")
    }

    #[tokio::test]
    async fn lexical_mode_never_sends_vector() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::new());
        let d = dispatcher(backend.clone(), embedder.clone());

        d.search("rust", SearchMode::Lexical, 3).await.unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.text.as_deref(), Some("rust"));
        assert!(request.vector.is_none());
        assert_eq!(request.top, 3);
        assert_eq!(embedder.embed_calls(), 0);
    }

    #[tokio::test]
    async fn vector_mode_never_sends_text() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::new());
        let d = dispatcher(backend.clone(), embedder.clone());

        d.search("rust", SearchMode::Vector, 4).await.unwrap();

        let request = backend.last_request().unwrap();
        assert!(request.text.is_none());
        let vq = request.vector.unwrap();
        assert_eq!(vq.k, 4);
        assert_eq!(vq.field, "text_vector");
        assert_eq!(embedder.embed_calls(), 1);
    }

    #[tokio::test]
    async fn hybrid_mode_sends_both() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::new());
        let d = dispatcher(backend.clone(), embedder.clone());

        d.search("rust", SearchMode::Hybrid, 3).await.unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.text.as_deref(), Some("rust"));
        assert!(request.vector.is_some());
    }

    #[tokio::test]
    async fn zero_top_k_rejected_before_dispatch() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::new());
        let d = dispatcher(backend.clone(), embedder.clone());

        let err = d.search("rust", SearchMode::Hybrid, 0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(backend.last_request().is_none());
        assert_eq!(embedder.embed_calls(), 0);
    }

    #[tokio::test]
    async fn query_normalized_and_truncated_before_embedding() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::new());
        let d = SearchDispatcher::new(
            backend,
            embedder.clone(),
            "embed-model",
            10,
            "text_vector",
        );

        d.search("a\n\n  bcdefghijklmn", SearchMode::Vector, 3)
            .await
            .unwrap();

        assert_eq!(embedder.last_embed_input().as_deref(), Some("a bcdefghi"));
    }

    #[tokio::test]
    async fn backend_failure_maps_to_search_error() {
        let backend = Arc::new(MockSearchBackend::failing());
        let embedder = Arc::new(MockProvider::new());
        let d = dispatcher(backend, embedder);

        let err = d.search("rust", SearchMode::Lexical, 3).await.unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[tokio::test]
    async fn embedder_failure_maps_to_embedding_error() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![]));
        let embedder = Arc::new(MockProvider::failing_embed());
        let d = dispatcher(backend.clone(), embedder);

        let err = d.search("rust", SearchMode::Vector, 3).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        // Embedding happens before dispatch, so nothing reached the index.
        assert!(backend.last_request().is_none());
    }
}
