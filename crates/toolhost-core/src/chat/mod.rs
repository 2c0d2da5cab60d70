//! Conversation state and the tool-use loop

mod conversation;
mod orchestrator;

pub use conversation::Conversation;
pub use orchestrator::{Orchestrator, TurnError, TurnOptions, TurnOutcome, TurnPhase};
