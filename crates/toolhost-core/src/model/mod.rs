//! Conversational model clients
//!
//! `GenaiModel` talks to real model APIs through the `genai` crate, which
//! handles streaming, provider protocols and tool calling. `ScriptedModel`
//! is kept for testing.

mod traits;
mod error;
mod genai_adapter;
mod genai_model;
mod mock;

pub use traits::{ModelClient, ModelRequest};
pub use error::{ModelCallError, ModelResult};
pub use genai_model::{GenaiModel, DEFAULT_MODEL};
pub use mock::ScriptedModel;
