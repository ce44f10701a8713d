//! Chat session — one user's conversation with the grounded pipeline.
//!
//! Each turn runs to completion before the next is accepted: embed →
//! search → assemble → complete → commit. Nothing is cached across turns
//! and every turn recomputes from scratch; that is current behavior, a
//! simplicity/cost tradeoff, not an oversight. The full history is sent on
//! every turn (no windowing).
//!
//! Failure policy:
//! - retrieval failures (embedding or index) degrade: the turn proceeds
//!   with an empty context and the error is surfaced in the outcome;
//! - completion failures abort the turn with no history mutation — the
//!   user/assistant pair commits only on full success.

use crate::context::{ContextAssembler, ContextBlock, FieldMap};
use crate::dispatcher::SearchDispatcher;
use crate::prompt::build_messages;
use grounded_config::AppConfig;
use grounded_core::error::{Error, Result};
use grounded_core::message::{Conversation, Message};
use grounded_core::provider::{CompletionRequest, Provider};
use grounded_core::search::SearchMode;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Session-wide defaults, resolved once from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub chat_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub default_mode: SearchMode,
    pub default_top_k: usize,
}

impl SessionSettings {
    /// Resolve settings from a validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let chat_model = config.chat.model.clone().ok_or(Error::Config {
            message: "chat.model missing".into(),
        })?;
        let default_mode = config
            .search
            .mode
            .parse::<SearchMode>()
            .map_err(|message| Error::Config { message })?;

        Ok(Self {
            chat_model,
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
            system_prompt: config.system_prompt.clone(),
            default_mode,
            default_top_k: config.search.top_k,
        })
    }
}

/// Per-turn overrides supplied by the display surface.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub mode: Option<SearchMode>,
    pub top_k: Option<usize>,
    pub temperature: Option<f32>,
}

/// What one turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The assistant's reply.
    pub answer: String,
    /// The grounding context that was sent (possibly empty).
    pub context: ContextBlock,
    /// A retrieval failure the turn survived, for inline display.
    pub search_error: Option<Error>,
}

/// One user's session: owns the conversation and the pipeline pieces.
pub struct ChatSession {
    chat: Arc<dyn Provider>,
    dispatcher: SearchDispatcher,
    assembler: ContextAssembler,
    settings: SessionSettings,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(
        chat: Arc<dyn Provider>,
        dispatcher: SearchDispatcher,
        fields: FieldMap,
        settings: SessionSettings,
    ) -> Self {
        Self {
            chat,
            dispatcher,
            assembler: ContextAssembler::new(fields),
            settings,
            conversation: Conversation::new(),
        }
    }

    /// The turn history so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Clear the whole history, returning the session to its empty state.
    pub fn reset(&mut self) {
        self.conversation.reset();
        info!("Conversation reset");
    }

    /// Process one user turn to completion.
    pub async fn run_turn(&mut self, question: &str, options: TurnOptions) -> Result<TurnOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidParameter("question must not be empty".into()));
        }

        self.conversation
            .append_system_if_absent(&self.settings.system_prompt);

        let mode = options.mode.unwrap_or(self.settings.default_mode);
        let top_k = options.top_k.unwrap_or(self.settings.default_top_k);

        info!(%mode, top_k, "Turn: starting retrieval");

        let (hits, search_error) = match self.dispatcher.search(question, mode, top_k).await {
            Ok(hits) => (hits, None),
            // A caller contract violation is not a provider failure; it
            // aborts the turn instead of degrading it.
            Err(err @ Error::InvalidParameter(_)) => return Err(err),
            Err(err) => {
                error!(%err, "Retrieval failed, continuing with empty context");
                (Vec::new(), Some(err))
            }
        };

        let context = self.assembler.assemble(&hits);
        debug!(entries = context.len(), "Context assembled");

        let messages = build_messages(&self.conversation, &context, question);

        let request = CompletionRequest {
            model: self.settings.chat_model.clone(),
            messages,
            temperature: options.temperature.unwrap_or(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        // Nothing has been committed yet; a completion failure leaves the
        // history exactly as it was before this call.
        let response = self.chat.complete(request).await.map_err(Error::Chat)?;
        let answer = response.message.content.clone();

        // Commit the pair. The stored user turn is the raw question, not
        // the grounded prompt.
        self.conversation.push(Message::user(question));
        self.conversation.push(response.message);

        info!(
            context_entries = context.len(),
            answer_len = answer.len(),
            "Turn: response generated"
        );

        Ok(TurnOutcome {
            answer,
            context,
            search_error,
        })
    }
}
