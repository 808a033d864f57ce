//! LLM side of the talk pipeline: conversation history, prompt building,
//! the two chat backends and the [`Responder`] that streams replies into a
//! [`tts_core::SpeechSink`] one sentence at a time.

pub mod backend;
pub mod config;
pub mod error;
pub mod history;
pub mod message;
pub mod prompt;
pub mod responder;

pub use backend::{ChatBackend, Delivery, FalBackend, FragmentStream, OpenAiBackend};
pub use config::{LlmConfig, LlmProvider};
pub use error::{LlmError, Result};
pub use history::{HistoryStore, MAX_HISTORY_MESSAGES, MAX_HISTORY_ROUNDS};
pub use message::{Message, Role};
pub use prompt::SYSTEM_PROMPT;
pub use responder::{Responder, TurnOutcome};
