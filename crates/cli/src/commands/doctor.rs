//! `grounded doctor` — diagnose configuration and provider connectivity.
//!
//! Runs one real round-trip against each collaborator: an embedding, a
//! minimal completion, and a search index probe.

use grounded_core::message::Message;
use grounded_core::provider::{CompletionRequest, EmbeddingRequest, Provider};
use grounded_core::search::SearchBackend;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("grounded doctor — connectivity diagnostics");
    println!("==========================================\n");

    let mut issues = 0;

    // Config must validate before anything can be probed.
    let config = match grounded_config::AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            return Err(e.into());
        }
    };

    // Embedding round-trip
    let embedder = grounded_providers::embedding_provider_from_config(&config)?;
    let embedding_model = config.embedding.model.clone().unwrap_or_default();
    match embedder
        .embed(EmbeddingRequest {
            model: embedding_model,
            inputs: vec!["hello, world".into()],
        })
        .await
    {
        Ok(response) => {
            let dims = response.embeddings.first().map(Vec::len).unwrap_or(0);
            println!("  ✅ Embedding endpoint reachable ({dims} dimensions)");
        }
        Err(e) => {
            println!("  ❌ Embedding endpoint failed: {e}");
            issues += 1;
        }
    }

    // Completion round-trip
    let chat = grounded_providers::chat_provider_from_config(&config)?;
    let mut request = CompletionRequest::new(
        config.chat.model.clone().unwrap_or_default(),
        vec![
            Message::system("You are a helpful assistant."),
            Message::user("Say hello."),
        ],
    );
    request.max_tokens = Some(50);
    match chat.complete(request).await {
        Ok(response) => {
            let preview: String = response.message.content.chars().take(40).collect();
            println!("  ✅ Chat endpoint reachable (\"{preview}...\")");
        }
        Err(e) => {
            println!("  ❌ Chat endpoint failed: {e}");
            issues += 1;
        }
    }

    // Search index probe
    let backend = grounded_providers::search_backend_from_config(&config)?;
    match backend.health_check().await {
        Ok(true) => println!("  ✅ Search index reachable"),
        Ok(false) => {
            println!("  ❌ Search index probe returned an error status");
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Search index unreachable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
        Ok(())
    } else {
        println!("  {issues} check(s) failed. See above for details.");
        Err(format!("{issues} connectivity check(s) failed").into())
    }
}
