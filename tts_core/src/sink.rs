//! Speech sinks: where finished text segments go to be synthesized.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::warn;

/// Session used when neither the caller nor the sink names one.
pub const DEFAULT_SESSION: &str = "default";

/// Downstream consumer of text segments.
///
/// `accept` is called once per segment, in order, as soon as the segment is
/// closed. Implementations must not block; queue the text and return.
pub trait SpeechSink: Send + Sync {
    fn accept(&self, segment: String);

    /// Conversation this sink speaks for.
    fn session_id(&self) -> &str {
        DEFAULT_SESSION
    }
}

impl<S: SpeechSink + ?Sized> SpeechSink for Arc<S> {
    fn accept(&self, segment: String) {
        (**self).accept(segment)
    }

    fn session_id(&self) -> &str {
        (**self).session_id()
    }
}

impl<S: SpeechSink + ?Sized> SpeechSink for &S {
    fn accept(&self, segment: String) {
        (**self).accept(segment)
    }

    fn session_id(&self) -> &str {
        (**self).session_id()
    }
}

/// Forwards segments into an unbounded channel read by a synthesis task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
    session_id: String,
}

impl ChannelSink {
    /// Create a sink and the receiving end the synthesizer drains.
    pub fn new(session_id: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                session_id: session_id.into(),
            },
            rx,
        )
    }
}

impl SpeechSink for ChannelSink {
    fn accept(&self, segment: String) {
        if self.tx.send(segment).is_err() {
            // Receiver dropped, nobody is listening anymore
            warn!(session = %self.session_id, "speech receiver closed, dropping segment");
        }
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Keeps every segment in memory; used when the caller wants the whole
/// sequence back at once.
#[derive(Debug, Default)]
pub struct CollectingSink {
    segments: Mutex<Vec<String>>,
    session_id: Option<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            segments: Mutex::new(Vec::new()),
            session_id: Some(session_id.into()),
        }
    }

    /// Segments received so far, in arrival order.
    pub fn segments(&self) -> Vec<String> {
        self.segments
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments.into_inner().unwrap_or_default()
    }
}

impl SpeechSink for CollectingSink {
    fn accept(&self, segment: String) {
        if let Ok(mut segments) = self.segments.lock() {
            segments.push(segment);
        }
    }

    fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DEFAULT_SESSION)
    }
}
