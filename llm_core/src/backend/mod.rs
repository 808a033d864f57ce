//! LLM backends.
//!
//! Both backends take a chat message list and hand back a stream of text
//! fragments. The streaming backend yields fragments as the model produces
//! them; the single-shot backend yields its whole answer as one fragment.

mod fal;
mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::message::Message;

pub use fal::{FalBackend, FAL_ANY_LLM_APP, FAL_MAX_TOKENS, FAL_TEMPERATURE};
pub use openai::OpenAiBackend;

/// Ordered text fragments of one reply.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// How a backend delivers its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Fragments arrive as they are generated.
    Streaming,
    /// One complete answer after generation finishes.
    SingleShot,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn delivery(&self) -> Delivery;

    /// Start generating a reply to `messages`.
    async fn generate(&self, messages: &[Message]) -> Result<FragmentStream>;
}
