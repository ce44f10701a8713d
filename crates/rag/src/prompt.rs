//! Prompt construction — the exact message sequence sent to the model.
//!
//! Order is fixed: the system turn if one exists, then all prior
//! user/assistant turns in recorded order, then one new user turn carrying
//! the labeled Sources and Question sections. Deterministic: same inputs
//! always produce the same sequence. The full history is sent every turn;
//! no windowing or truncation happens here.

use crate::context::ContextBlock;
use grounded_core::message::{Conversation, Message, Role};

/// The content of the grounded user turn: a Sources section rendered from
/// the context block, followed by the verbatim question.
pub fn grounded_user_content(context: &ContextBlock, question: &str) -> String {
    format!(
        "### Sources:\n\n{}### Question:\n\n{}",
        context.render(),
        question
    )
}

/// Build the outbound message list for one turn.
pub fn build_messages(
    conversation: &Conversation,
    context: &ContextBlock,
    question: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);

    if let Some(system) = conversation.system_message() {
        messages.push(system.clone());
    }
    messages.extend(
        conversation
            .messages()
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned(),
    );
    messages.push(Message::user(grounded_user_content(context, question)));

    messages
}
