use std::time::Instant;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChatBackend, Delivery, FragmentStream};
use crate::config::{mask_secret, LlmConfig, DEFAULT_FAL_BASE_URL, DEFAULT_FAL_MODEL};
use crate::error::{LlmError, Result};
use crate::message::Message;
use crate::prompt::render_transcript;

/// fal.ai application serving arbitrary hosted models.
pub const FAL_ANY_LLM_APP: &str = "fal-ai/any-llm";
pub const FAL_MAX_TOKENS: u32 = 2048;
pub const FAL_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct AnyLlmRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system_prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct AnyLlmResponse {
    #[serde(default)]
    output: String,
    #[serde(default)]
    error: Option<String>,
}

/// Single-shot completion through fal.ai `any-llm`.
///
/// The chat history is flattened into a text transcript; the whole answer
/// comes back in one response and is yielded as a single fragment.
pub struct FalBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl FalBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_FAL_BASE_URL.to_string(),
            model: DEFAULT_FAL_MODEL.to_string(),
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

    /// `None` when no fal credential is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.fal_api_key.clone()?;
        info!("Using fal.ai LLM: {}", config.fal_model);
        debug!("fal api_key: {}", mask_secret(Some(&api_key)));

        Some(
            Self::new(api_key)
                .with_base_url(config.fal_base_url.clone())
                .with_model(config.fal_model.clone()),
        )
    }

    /// Run one completion and return the raw output text (possibly empty).
    pub async fn complete(&self, messages: &[Message]) -> Result<String> {
        let transcript = render_transcript(messages);
        let body = AnyLlmRequest {
            model: &self.model,
            prompt: &transcript.prompt,
            system_prompt: &transcript.system_prompt,
            max_tokens: FAL_MAX_TOKENS,
            temperature: FAL_TEMPERATURE,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, FAL_ANY_LLM_APP))
            .header(header::AUTHORIZATION, format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: AnyLlmResponse = response.json().await?;
        debug!("fal.ai LLM response time: {:.2}s", start.elapsed().as_secs_f64());

        if let Some(error) = reply.error.filter(|e| !e.is_empty()) {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: error,
            });
        }
        Ok(reply.output)
    }
}

#[async_trait]
impl ChatBackend for FalBackend {
    fn name(&self) -> &str {
        "fal"
    }

    fn delivery(&self) -> Delivery {
        Delivery::SingleShot
    }

    async fn generate(&self, messages: &[Message]) -> Result<FragmentStream> {
        let output = self.complete(messages).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(output) })))
    }
}
