//! CLI subcommands.

pub mod ask;
pub mod chat;
pub mod doctor;

use grounded_config::AppConfig;
use grounded_rag::{ChatSession, FieldMap, SearchDispatcher, SessionSettings};

/// Load configuration and print setup guidance on failure.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    match AppConfig::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: {e}");
            eprintln!();
            eprintln!("  grounded needs a chat endpoint, an embedding model, and a search index.");
            eprintln!("  Set them via environment variables:");
            eprintln!("    OPENAI_API_ENDPOINT / OPENAI_API_KEY / OPENAI_ENGINE");
            eprintln!("    EMBEDDING_MODEL  (EMBEDDING_API_ENDPOINT to use a separate endpoint)");
            eprintln!("    SEARCH_ENDPOINT / SEARCH_API_KEY / SEARCH_INDEX_NAME");
            eprintln!();
            eprintln!("  Or add them to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            Err(e.into())
        }
    }
}

/// Wire the pipeline from a validated configuration.
pub(crate) fn build_session(config: &AppConfig) -> Result<ChatSession, Box<dyn std::error::Error>> {
    let chat = grounded_providers::chat_provider_from_config(config)?;
    let embedder = grounded_providers::embedding_provider_from_config(config)?;
    let backend = grounded_providers::search_backend_from_config(config)?;

    let embedding_model = config
        .embedding
        .model
        .clone()
        .ok_or("embedding.model missing from configuration")?;

    let dispatcher = SearchDispatcher::new(
        backend,
        embedder,
        embedding_model,
        config.embedding.input_limit,
        config.search.vector_field.clone(),
    );

    let settings = SessionSettings::from_config(config)?;
    let fields = FieldMap::from(&config.search.fields);

    Ok(ChatSession::new(chat, dispatcher, fields, settings))
}
