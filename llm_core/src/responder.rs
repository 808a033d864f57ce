//! Turns one user message into spoken segments plus a history update.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, error, info, warn};
use tts_core::{Segmenter, SpeechSink};

use crate::backend::{ChatBackend, Delivery, FalBackend, OpenAiBackend};
use crate::config::{LlmConfig, LlmProvider};
use crate::error::{LlmError, Result};
use crate::history::HistoryStore;
use crate::message::{Message, Role};
use crate::prompt::{build_messages, SYSTEM_PROMPT};

/// Result of one [`Responder::respond`] call.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The reply was spoken and recorded in history.
    Completed { reply: String, segments: usize },
    /// The backend answered with nothing; history is untouched.
    Empty,
    /// The backend call failed; history is untouched.
    Failed(LlmError),
}

impl TurnOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            TurnOutcome::Completed { reply, .. } => Some(reply),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TurnOutcome::Failed(_))
    }
}

/// Drives chat turns against one backend, keeping per-session history.
///
/// Construct once at startup and share; the backend choice is fixed for the
/// responder's lifetime.
pub struct Responder {
    backend: Box<dyn ChatBackend>,
    history: Mutex<HistoryStore>,
    system_prompt: String,
}

impl Responder {
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self {
            backend,
            history: Mutex::new(HistoryStore::new()),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Pick the backend from configuration.
    ///
    /// Asking for fal.ai without a fal credential falls back to the
    /// OpenAI-compatible backend with a warning.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let backend: Box<dyn ChatBackend> = match config.requested_provider() {
            LlmProvider::Fal => match FalBackend::from_config(config) {
                Some(fal) => Box::new(fal),
                None => {
                    warn!("FAL_KEY not set, falling back to OpenAI compatible API");
                    Box::new(OpenAiBackend::from_config(config)?)
                }
            },
            LlmProvider::OpenAi => Box::new(OpenAiBackend::from_config(config)?),
        };
        info!("LLM backend: {}", backend.name());
        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Answer `message`, forwarding each finished sentence to `sink`.
    ///
    /// Without an explicit `session`, the sink's own session id is used.
    /// Segments are forwarded as soon as they close; on failure the ones
    /// already forwarded stay forwarded and the unfinished remainder is
    /// dropped.
    pub async fn respond(
        &self,
        message: &str,
        session: Option<&str>,
        sink: &dyn SpeechSink,
    ) -> TurnOutcome {
        let session = session.unwrap_or_else(|| sink.session_id()).to_string();
        debug!("Session {}: User message: {}", session, message);

        let messages = {
            let mut history = self.lock_history();
            let prior: Vec<Message> = history.get(&session).iter().cloned().collect();
            build_messages(&self.system_prompt, &prior, message)
        };

        let start = Instant::now();
        let mut fragments = match self.backend.generate(&messages).await {
            Ok(stream) => stream,
            Err(e) => return self.fail(&session, e),
        };

        let mut reply = String::new();
        let mut segmenter = Segmenter::new();
        let mut first = true;
        while let Some(fragment) = fragments.next().await {
            let fragment = match fragment {
                Ok(f) => f,
                Err(e) => return self.fail(&session, e),
            };
            if first {
                debug!("llm Time to first chunk: {:.3}s", start.elapsed().as_secs_f64());
                first = false;
            }
            reply.push_str(&fragment);
            segmenter.push(&fragment, |segment| sink.accept(segment));
        }

        if reply.is_empty() && self.backend.delivery() == Delivery::SingleShot {
            warn!("Empty response from {} LLM for session {}", self.backend.name(), session);
            return TurnOutcome::Empty;
        }

        let segments = segmenter.finish(|segment| sink.accept(segment));
        debug!(
            "llm total time: {:.3}s, {} segment(s)",
            start.elapsed().as_secs_f64(),
            segments
        );

        {
            let mut history = self.lock_history();
            history.append(&session, Role::User, message);
            history.append(&session, Role::Assistant, reply.as_str());
        }

        TurnOutcome::Completed { reply, segments }
    }

    /// Current history of `session`, oldest first.
    pub fn history(&self, session: &str) -> Vec<Message> {
        self.lock_history().snapshot(session)
    }

    /// Forget one session, or all of them with `None`.
    pub fn clear_history(&self, session: Option<&str>) {
        self.lock_history().clear(session);
    }

    fn fail(&self, session: &str, err: LlmError) -> TurnOutcome {
        error!("{} LLM error for session {}: {}", self.backend.name(), session, err);
        TurnOutcome::Failed(err)
    }

    fn lock_history(&self) -> MutexGuard<'_, HistoryStore> {
        // A panic mid-append cannot leave the store inconsistent
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
