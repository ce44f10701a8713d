//! Shared test doubles for pipeline tests.

use async_trait::async_trait;
use grounded_core::error::{ProviderError, SearchError};
use grounded_core::message::Message;
use grounded_core::provider::{
    CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse, Provider,
};
use grounded_core::search::{SearchBackend, SearchHit, SearchRequest};
use std::sync::Mutex;

/// A mock provider with scripted completion replies and a fixed embedding.
///
/// Captures the last requests so tests can assert on the exact shapes the
/// pipeline emitted.
pub struct MockProvider {
    completions: Mutex<Vec<String>>,
    fail_complete: bool,
    fail_when_exhausted: bool,
    fail_embed: bool,
    embed_calls: Mutex<usize>,
    last_embed_input: Mutex<Option<String>>,
    last_completion: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_completions(vec!["mock answer".into()])
    }

    pub fn with_completions(completions: Vec<String>) -> Self {
        Self {
            completions: Mutex::new(completions),
            fail_complete: false,
            fail_when_exhausted: false,
            fail_embed: false,
            embed_calls: Mutex::new(0),
            last_embed_input: Mutex::new(None),
            last_completion: Mutex::new(None),
        }
    }

    pub fn failing_complete() -> Self {
        Self {
            fail_complete: true,
            ..Self::new()
        }
    }

    /// Scripted replies, then errors once they run out.
    pub fn completions_then_fail(completions: Vec<String>) -> Self {
        Self {
            fail_when_exhausted: true,
            ..Self::with_completions(completions)
        }
    }

    pub fn failing_embed() -> Self {
        Self {
            fail_embed: true,
            ..Self::new()
        }
    }

    pub fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }

    pub fn last_embed_input(&self) -> Option<String> {
        self.last_embed_input.lock().unwrap().clone()
    }

    pub fn last_completion_request(&self) -> Option<CompletionRequest> {
        self.last_completion.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        *self.last_completion.lock().unwrap() = Some(request);

        if self.fail_complete {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "scripted completion failure".into(),
            });
        }

        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            if self.fail_when_exhausted {
                return Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "scripted completions exhausted".into(),
                });
            }
            panic!("MockProvider: no more scripted completions");
        }
        let content = completions.remove(0);

        Ok(CompletionResponse {
            message: Message::assistant(content),
            usage: None,
            model: "mock-model".into(),
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        *self.embed_calls.lock().unwrap() += 1;
        *self.last_embed_input.lock().unwrap() = request.inputs.first().cloned();

        if self.fail_embed {
            return Err(ProviderError::Network("scripted embedding failure".into()));
        }

        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|_| vec![0.1, 0.2, 0.3]).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// A mock search backend returning scripted hits or a scripted failure.
pub struct MockSearchBackend {
    hits: Vec<SearchHit>,
    fail: bool,
    last_request: Mutex<Option<SearchRequest>>,
}

impl MockSearchBackend {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: vec![],
            fail: true,
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Build a hit with the default index schema fields.
pub fn make_hit(title: &str, content: &str, score: f64) -> SearchHit {
    let mut fields = serde_json::Map::new();
    fields.insert("title".into(), serde_json::json!(title));
    fields.insert("chunk".into(), serde_json::json!(content));
    SearchHit { score, fields }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    fn name(&self) -> &str {
        "mock-search"
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        *self.last_request.lock().unwrap() = Some(request);

        if self.fail {
            return Err(SearchError::ApiError {
                status_code: 503,
                message: "scripted search failure".into(),
            });
        }

        Ok(self.hits.clone())
    }
}
