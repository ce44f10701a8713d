//! Configuration loading and validation for grounded.
//!
//! Loads configuration from `~/.grounded/config.toml` with environment
//! variable overrides, then validates. Unlike defaults such as `top_k`,
//! provider endpoints, credentials, and model names have no fallback:
//! a missing required value fails startup rather than a later request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.grounded/config.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// The grounding system prompt prepended to every session.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Chat completion provider settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Document index settings.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_system_prompt() -> String {
    "You are an assistant that answers questions about a document collection.\n\
     Answer using only the facts listed in the Sources section.\n\
     If the sources do not contain enough information, say you don't know.\n\
     Do not produce answers that are not backed by the sources.\n\
     Do not include role labels (such as user or assistant) in your answer.\n\
     Ask a clarifying question when the user's question is ambiguous."
        .into()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the OpenAI-compatible chat endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key for the chat endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model (or deployment) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Decoding temperature, constrained to [0.0, 1.0].
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    1000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding endpoint. Falls back to `chat.api_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key for the embedding endpoint. Falls back to `chat.api_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Embedding model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Maximum input length in characters; longer input is truncated
    /// with a warning rather than rejected.
    #[serde(default = "default_input_limit")]
    pub input_limit: usize,
}

fn default_input_limit() -> usize {
    7000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: None,
            input_limit: default_input_limit(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search service endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Search service API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Index name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// REST API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Default number of passages to retrieve.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Default search mode: lexical, vector, or hybrid.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Index field holding document vectors.
    #[serde(default = "default_vector_field")]
    pub vector_field: String,

    /// How document fields map onto context entries.
    #[serde(default)]
    pub fields: FieldsConfig,
}

fn default_api_version() -> String {
    "2024-07-01".into()
}
fn default_top_k() -> usize {
    3
}
fn default_mode() -> String {
    "hybrid".into()
}
fn default_vector_field() -> String {
    "text_vector".into()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            index: None,
            api_version: default_api_version(),
            top_k: default_top_k(),
            mode: default_mode(),
            vector_field: default_vector_field(),
            fields: FieldsConfig::default(),
        }
    }
}

/// The index schema is external configuration, not a fixed contract:
/// these names tell the context assembler where to find each piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsConfig {
    /// Field holding the passage title / source path.
    #[serde(default = "default_title_field")]
    pub title: String,

    /// Field holding the passage text.
    #[serde(default = "default_content_field")]
    pub content: String,

    /// Field holding the compound chunk identifier.
    #[serde(default = "default_id_field")]
    pub id: String,

    /// Marker inside the compound identifier; the chunk sequence id is
    /// everything after its first occurrence.
    #[serde(default = "default_id_marker")]
    pub id_marker: String,
}

fn default_title_field() -> String {
    "title".into()
}
fn default_content_field() -> String {
    "chunk".into()
}
fn default_id_field() -> String {
    "chunk_id".into()
}
fn default_id_marker() -> String {
    "pages_".into()
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            title: default_title_field(),
            content: default_content_field(),
            id: default_id_field(),
            id_marker: default_id_marker(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("system_prompt", &format!("{} chars", self.system_prompt.len()))
            .field("chat", &self.chat)
            .field("embedding", &self.embedding)
            .field("search", &self.search)
            .finish()
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("input_limit", &self.input_limit)
            .finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("index", &self.index)
            .field("api_version", &self.api_version)
            .field("top_k", &self.top_k)
            .field("mode", &self.mode)
            .field("vector_field", &self.vector_field)
            .field("fields", &self.fields)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.grounded/config.toml),
    /// apply environment variable overrides, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::read_file(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file path (no env overrides, still validated).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, relying on environment", path.display());
            return Ok(Self {
                system_prompt: default_system_prompt(),
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment variable overrides through the given lookup.
    ///
    /// Only fills values not already present in the file, mirroring the
    /// usual env-over-file precedence for secrets that should never be
    /// committed to a config file.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let first = |names: &[&str]| names.iter().find_map(|n| env(n));

        if self.chat.api_url.is_none() {
            self.chat.api_url = first(&["GROUNDED_API_URL", "OPENAI_API_ENDPOINT"]);
        }
        if self.chat.api_key.is_none() {
            self.chat.api_key = first(&["GROUNDED_API_KEY", "OPENAI_API_KEY"]);
        }
        if self.chat.model.is_none() {
            self.chat.model = first(&["GROUNDED_MODEL", "OPENAI_ENGINE"]);
        }

        if self.embedding.api_url.is_none() {
            self.embedding.api_url = first(&["GROUNDED_EMBEDDING_API_URL", "EMBEDDING_API_ENDPOINT"]);
        }
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = first(&["GROUNDED_EMBEDDING_API_KEY", "EMBEDDING_API_KEY"]);
        }
        if self.embedding.model.is_none() {
            self.embedding.model = first(&["GROUNDED_EMBEDDING_MODEL", "EMBEDDING_MODEL"]);
        }

        if self.search.endpoint.is_none() {
            self.search.endpoint = first(&["GROUNDED_SEARCH_ENDPOINT", "SEARCH_ENDPOINT"]);
        }
        if self.search.api_key.is_none() {
            self.search.api_key = first(&["GROUNDED_SEARCH_API_KEY", "SEARCH_API_KEY"]);
        }
        if self.search.index.is_none() {
            self.search.index = first(&["GROUNDED_SEARCH_INDEX", "SEARCH_INDEX_NAME"]);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".grounded")
    }

    /// Effective embedding endpoint: its own, or the chat one.
    pub fn embedding_api_url(&self) -> Option<&str> {
        self.embedding
            .api_url
            .as_deref()
            .or(self.chat.api_url.as_deref())
    }

    /// Effective embedding key: its own, or the chat one.
    pub fn embedding_api_key(&self) -> Option<&str> {
        self.embedding
            .api_key
            .as_deref()
            .or(self.chat.api_key.as_deref())
    }

    /// Validate the merged configuration. Missing required values are
    /// startup-fatal so every later request can assume they exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chat
            .api_url
            .as_ref()
            .ok_or(ConfigError::MissingValue("chat.api_url"))?;
        self.chat
            .api_key
            .as_ref()
            .ok_or(ConfigError::MissingValue("chat.api_key"))?;
        self.chat
            .model
            .as_ref()
            .ok_or(ConfigError::MissingValue("chat.model"))?;
        self.embedding
            .model
            .as_ref()
            .ok_or(ConfigError::MissingValue("embedding.model"))?;
        self.search
            .endpoint
            .as_ref()
            .ok_or(ConfigError::MissingValue("search.endpoint"))?;
        self.search
            .api_key
            .as_ref()
            .ok_or(ConfigError::MissingValue("search.api_key"))?;
        self.search
            .index
            .as_ref()
            .ok_or(ConfigError::MissingValue("search.index"))?;

        if !(0.0..=1.0).contains(&self.chat.temperature) {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 1.0".into(),
            ));
        }
        if self.search.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "search.top_k must be at least 1".into(),
            ));
        }
        self.search
            .mode
            .parse::<grounded_core::SearchMode>()
            .map_err(ConfigError::ValidationError)?;

        Ok(())
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Required configuration value missing: {0}")]
    MissingValue(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
