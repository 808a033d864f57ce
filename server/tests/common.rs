//! Common utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use llm_core::{ChatBackend, Delivery, FragmentStream, LlmError, Message, Responder};
use server::{build_router, config::ServerConfig, AppState};

/// Backend that streams a canned reply, or fails when `fragments` is `None`.
pub struct CannedBackend {
    pub fragments: Option<Vec<&'static str>>,
}

#[async_trait]
impl ChatBackend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    fn delivery(&self) -> Delivery {
        Delivery::Streaming
    }

    async fn generate(&self, _messages: &[Message]) -> llm_core::Result<FragmentStream> {
        match &self.fragments {
            Some(fragments) => {
                let items: Vec<llm_core::Result<String>> =
                    fragments.iter().map(|f| Ok(f.to_string())).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            None => Err(LlmError::Api {
                status: 503,
                body: "backend down".to_string(),
            }),
        }
    }
}

pub fn test_state(fragments: Option<Vec<&'static str>>) -> AppState {
    let responder = Responder::new(Box::new(CannedBackend { fragments }));
    AppState {
        responder: Arc::new(responder),
        config: ServerConfig::default(),
    }
}

/// Router whose backend always answers with the given fragments
pub fn create_test_app(fragments: &[&'static str]) -> Router {
    build_router(test_state(Some(fragments.to_vec())))
}

/// Router whose backend always fails
pub fn create_failing_app() -> Router {
    build_router(test_state(None))
}
