//! Search backend trait and request/result types.
//!
//! The document index is an external collaborator with its own schema: the
//! only field this crate interprets is the relevance score. Everything else
//! is carried as a raw field map for the context assembler to interpret
//! against its configured field names.

use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of {lexical text, vector} are populated in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Full-text search only — no vector clause.
    Lexical,
    /// Vector nearest-neighbor only — no lexical text.
    Vector,
    /// Both; the provider fuses the two result sets.
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Lexical => write!(f, "lexical"),
            SearchMode::Vector => write!(f, "vector"),
            SearchMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexical" | "text" | "fulltext" => Ok(SearchMode::Lexical),
            "vector" => Ok(SearchMode::Vector),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(format!(
                "unknown search mode '{other}' (expected lexical, vector, or hybrid)"
            )),
        }
    }
}

/// A vector nearest-neighbor clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorQuery {
    /// The query embedding.
    pub vector: Vec<f32>,

    /// How many neighbors to request.
    pub k: usize,

    /// The index field holding document vectors.
    pub field: String,
}

/// The outbound search request shape.
///
/// Invariant (enforced by the dispatcher, checked by tests): vector mode
/// never populates `text`, lexical mode never populates `vector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Lexical query text, if the mode carries one.
    pub text: Option<String>,

    /// Vector clause, if the mode carries one.
    pub vector: Option<VectorQuery>,

    /// Result limit.
    pub top: usize,
}

/// One retrieved passage: the relevance score plus the raw provider fields.
///
/// Field names for title/content/id are index-configuration-dependent and
/// are mapped by the context assembler, not fixed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Relevance score as reported by the provider.
    pub score: f64,

    /// All remaining document fields, verbatim.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// The document index trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Execute a search. Results arrive in provider order (assumed
    /// score-descending) and are not re-sorted locally.
    async fn search(
        &self,
        request: SearchRequest,
    ) -> std::result::Result<Vec<SearchHit>, SearchError>;

    /// Health check — can we reach the index?
    async fn health_check(&self) -> std::result::Result<bool, SearchError> {
        Ok(true)
    }
}
