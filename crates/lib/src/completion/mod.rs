//! Completion API client (OpenAI-compatible chat completions).

mod openai;

pub use openai::{ChatMessage, CompletionClient, CompletionError};
