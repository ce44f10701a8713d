//! The retrieval-and-grounding pipeline.
//!
//! Turns a user question into a search query, retrieves supporting
//! passages, assembles them into a grounding context, builds the outbound
//! message list, and threads the conversation across turns.
//!
//! # Flow per turn
//!
//! 1. Validate the question
//! 2. Dispatch the search (embedding the query when the mode needs a vector)
//! 3. Assemble retrieved passages into a context block
//! 4. Build the prompt: system turn, history, grounded question
//! 5. Complete; commit the user/assistant pair only on full success

pub mod context;
pub mod dispatcher;
pub mod prompt;
pub mod session;

pub use context::{ContextAssembler, ContextBlock, ContextEntry, FieldMap};
pub use dispatcher::SearchDispatcher;
pub use prompt::{build_messages, grounded_user_content};
pub use session::{ChatSession, SessionSettings, TurnOptions, TurnOutcome};

#[cfg(test)]
pub(crate) mod test_helpers;
