use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{pin_mut, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatBackend, Delivery, FragmentStream};
use crate::config::{mask_secret, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{LlmError, Result};
use crate::message::Message;

/// Request body for a streaming chat completion
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Serialize)]
struct StreamOptions {
    include_usage: bool,
}

/// One `data:` payload of the event stream
#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

// Providers differ in which counters they report; all are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

/// OpenAI-compatible `/chat/completions` backend with server-sent events.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("LLM_API_KEY is not set".to_string()))?;

        debug!(
            "llm api_key: {}, llm base_url: {}, llm model: {}",
            mask_secret(Some(&api_key)),
            config.base_url,
            config.model
        );

        Ok(Self::new(api_key)
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone()))
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn delivery(&self) -> Delivery {
        Delivery::Streaming
    }

    async fn generate(&self, messages: &[Message]) -> Result<FragmentStream> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        Ok(Box::pin(fragments(response)))
    }
}

/// Text deltas of an SSE chat completion, in arrival order.
///
/// Ends at `data: [DONE]` or when the connection closes.
fn fragments(response: reqwest::Response) -> impl Stream<Item = Result<String>> + Send {
    try_stream! {
        let events = response.bytes_stream().eventsource();
        pin_mut!(events);

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if event.data == "[DONE]" {
                break;
            }

            let chunk: StreamChunk = serde_json::from_str(&event.data)?;
            if let Some(usage) = &chunk.usage {
                debug!(
                    prompt_tokens = ?usage.prompt_tokens,
                    completion_tokens = ?usage.completion_tokens,
                    total_tokens = ?usage.total_tokens,
                    "llm usage"
                );
            }

            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default();
            if !content.is_empty() {
                yield content;
            }
        }
    }
}
