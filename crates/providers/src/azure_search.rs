//! Azure AI Search backend implementation.
//!
//! Speaks the Azure AI Search REST surface:
//! `POST {endpoint}/indexes/{index}/docs/search?api-version=...` with an
//! `api-key` header. Lexical text and vector clauses are populated from the
//! incoming [`SearchRequest`]; the service performs hybrid fusion when both
//! are present, so no local merging or re-ranking happens here.

use async_trait::async_trait;
use grounded_core::error::SearchError;
use grounded_core::search::{SearchBackend, SearchHit, SearchRequest};
use serde::Deserialize;
use tracing::{debug, warn};

/// Field carrying the relevance score in every result document.
const SCORE_FIELD: &str = "@search.score";

/// A document index reached over the Azure AI Search REST API.
pub struct AzureSearchBackend {
    endpoint: String,
    index: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureSearchBackend {
    pub fn new(
        endpoint: impl Into<String>,
        index: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index: index.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            client,
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, self.api_version
        )
    }

    /// Build the request body from the dispatch shape.
    ///
    /// `search` appears only when lexical text is present; the vector
    /// clause only when a vector is present. For vector and hybrid requests
    /// the limit rides inside the clause as `k`; a plain lexical request
    /// carries it as `top`.
    fn build_body(request: &SearchRequest) -> serde_json::Value {
        let mut body = serde_json::Map::new();

        if let Some(text) = &request.text {
            body.insert("search".into(), serde_json::json!(text));
        }

        match &request.vector {
            Some(vq) => {
                body.insert(
                    "vectorQueries".into(),
                    serde_json::json!([{
                        "kind": "vector",
                        "vector": vq.vector,
                        "k": vq.k,
                        "fields": vq.field,
                    }]),
                );
            }
            None => {
                body.insert("top".into(), serde_json::json!(request.top));
            }
        }

        serde_json::Value::Object(body)
    }

    fn map_error_status(status: u16, body: String) -> SearchError {
        match status {
            429 => SearchError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => {
                SearchError::AuthenticationFailed("Invalid api-key or insufficient permissions".into())
            }
            _ => SearchError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Lift each result document into a [`SearchHit`]: the score field is
    /// interpreted, everything else is carried verbatim for the assembler.
    fn parse_hits(documents: Vec<serde_json::Map<String, serde_json::Value>>) -> Vec<SearchHit> {
        documents
            .into_iter()
            .map(|mut fields| {
                let score = fields
                    .remove(SCORE_FIELD)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                SearchHit { score, fields }
            })
            .collect()
    }
}

#[async_trait]
impl SearchBackend for AzureSearchBackend {
    fn name(&self) -> &str {
        "azure-search"
    }

    async fn search(
        &self,
        request: SearchRequest,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let body = Self::build_body(&request);

        debug!(
            index = %self.index,
            lexical = request.text.is_some(),
            vector = request.vector.is_some(),
            top = request.top,
            "Sending search request"
        );

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Search service returned error");
            return Err(Self::map_error_status(status, error_body));
        }

        let api_response: SearchApiResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(Self::parse_hits(api_response.value))
    }

    async fn health_check(&self) -> std::result::Result<bool, SearchError> {
        let url = format!(
            "{}/indexes/{}?api-version={}",
            self.endpoint, self.index, self.api_version
        );
        let response = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    #[serde(default)]
    value: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounded_core::search::VectorQuery;

    fn lexical_request() -> SearchRequest {
        SearchRequest {
            text: Some("rust ownership".into()),
            vector: None,
            top: 3,
        }
    }

    fn vector_request() -> SearchRequest {
        SearchRequest {
            text: None,
            vector: Some(VectorQuery {
                vector: vec![0.1, 0.2],
                k: 3,
                field: "text_vector".into(),
            }),
            top: 3,
        }
    }

    #[test]
    fn lexical_body_has_text_and_top_only() {
        let body = AzureSearchBackend::build_body(&lexical_request());
        assert_eq!(body["search"], "rust ownership");
        assert_eq!(body["top"], 3);
        assert!(body.get("vectorQueries").is_none());
    }

    #[test]
    fn vector_body_has_no_lexical_text() {
        let body = AzureSearchBackend::build_body(&vector_request());
        assert!(body.get("search").is_none());
        assert!(body.get("top").is_none());
        let vq = &body["vectorQueries"][0];
        assert_eq!(vq["kind"], "vector");
        assert_eq!(vq["k"], 3);
        assert_eq!(vq["fields"], "text_vector");
    }

    #[test]
    fn hybrid_body_has_both() {
        let mut request = vector_request();
        request.text = Some("rust ownership".into());
        let body = AzureSearchBackend::build_body(&request);
        assert_eq!(body["search"], "rust ownership");
        assert!(body.get("vectorQueries").is_some());
    }

    #[test]
    fn parse_hits_lifts_score() {
        let data = r#"{
            "value": [
                {"@search.score": 1.42, "title": "doc.pdf", "chunk": "text"},
                {"title": "scoreless.pdf", "chunk": "text"}
            ]
        }"#;
        let parsed: SearchApiResponse = serde_json::from_str(data).unwrap();
        let hits = AzureSearchBackend::parse_hits(parsed.value);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].score - 1.42).abs() < f64::EPSILON);
        assert_eq!(hits[0].fields["title"], "doc.pdf");
        assert!(!hits[0].fields.contains_key("@search.score"));
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn parse_empty_response() {
        let parsed: SearchApiResponse = serde_json::from_str("{}").unwrap();
        assert!(AzureSearchBackend::parse_hits(parsed.value).is_empty());
    }

    #[test]
    fn search_url_shape() {
        let backend = AzureSearchBackend::new(
            "https://search.example.com/",
            "my-index",
            "key",
            "2024-07-01",
        );
        assert_eq!(
            backend.search_url(),
            "https://search.example.com/indexes/my-index/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            AzureSearchBackend::map_error_status(403, String::new()),
            SearchError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            AzureSearchBackend::map_error_status(429, String::new()),
            SearchError::RateLimited { .. }
        ));
        assert!(matches!(
            AzureSearchBackend::map_error_status(503, String::new()),
            SearchError::ApiError {
                status_code: 503,
                ..
            }
        ));
    }
}
