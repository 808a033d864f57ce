pub mod config;
pub mod error;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, Request, State, WebSocketUpgrade,
    },
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use llm_core::{Message, Responder, TurnOutcome};
use tts_core::{ChannelSink, CollectingSink};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::{validate_chat_request, validate_session_id};

#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
    pub config: ServerConfig,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    message: String,
    session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    session_id: String,
    reply: String,
    segments: Vec<String>,
}

/// Build the application router: every route is served both at the root and
/// under `/api`.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(cors)
        .into_inner();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/chat", post(chat_endpoint))
        .route("/chat/ws", get(chat_ws))
        .route("/history", delete(clear_all_history))
        .route(
            "/history/{session_id}",
            get(get_history).delete(clear_session_history),
        );

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .flatten()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        base.allow_origin(tower_http::cors::Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(tower_http::cors::AllowOrigin::list(origins))
    }
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = header.clone() {
        request.headers_mut().insert("x-request-id", value);
    }
    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub async fn health_check() -> &'static str {
    "ok"
}

fn resolve_session(session_id: Option<String>) -> Result<String, ApiError> {
    match session_id {
        Some(id) => {
            validate_session_id(&id)?;
            Ok(id)
        }
        None => Ok(uuid::Uuid::new_v4().to_string()),
    }
}

pub async fn chat_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate_chat_request(&req.message)?;
    let session_id = resolve_session(req.session_id)?;

    info!(
        "Chat request received: message length={}, session={}",
        req.message.len(),
        session_id
    );

    let sink = CollectingSink::for_session(session_id.clone());
    let outcome = state
        .responder
        .respond(&req.message, Some(&session_id), &sink)
        .await;

    let reply = match outcome {
        TurnOutcome::Completed { reply, .. } => reply,
        TurnOutcome::Empty => String::new(),
        TurnOutcome::Failed(e) => return Err(ApiError::Upstream(e)),
    };

    Ok(Json(ChatResponse {
        session_id,
        reply,
        segments: sink.into_segments(),
    }))
}

/// Streams each segment to the client the moment it is closed.
///
/// Client frames: `{"message": "...", "session_id": "..."}`. Server frames:
/// `segment`, then `done` or `error`.
pub async fn chat_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state))
}

async fn handle_chat_socket(mut socket: WebSocket, state: AppState) {
    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let req: ChatRequest = match serde_json::from_str(text.as_str()) {
            Ok(req) => req,
            Err(e) => {
                let frame = serde_json::json!({ "type": "error", "error": format!("Invalid request: {e}"), "code": 400 });
                if send_json(&mut socket, frame).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let checked = validate_chat_request(&req.message).and_then(|_| resolve_session(req.session_id));
        let session_id = match checked {
            Ok(id) => id,
            Err(e) => {
                let frame = serde_json::json!({ "type": "error", "error": e.to_string(), "code": 400 });
                if send_json(&mut socket, frame).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let (sink, mut rx) = ChannelSink::new(session_id.clone());
        let responder = state.responder.clone();
        let message = req.message;
        let turn_session = session_id.clone();
        let turn = async move {
            let outcome = responder.respond(&message, Some(&turn_session), &sink).await;
            // closing the sink ends the forwarding loop below
            drop(sink);
            outcome
        };

        let forward = async {
            while let Some(segment) = rx.recv().await {
                let frame = serde_json::json!({ "type": "segment", "text": segment });
                if send_json(&mut socket, frame).await.is_err() {
                    warn!("Failed to send WS segment for session {}", session_id);
                    return false;
                }
            }
            true
        };

        let (outcome, connected) = tokio::join!(turn, forward);
        if !connected {
            break;
        }

        let frame = match outcome {
            TurnOutcome::Completed { reply, segments } => serde_json::json!({
                "type": "done",
                "session_id": session_id,
                "reply": reply,
                "segments": segments
            }),
            TurnOutcome::Empty => serde_json::json!({
                "type": "done",
                "session_id": session_id,
                "reply": "",
                "segments": 0
            }),
            TurnOutcome::Failed(e) => serde_json::json!({
                "type": "error",
                "session_id": session_id,
                "error": format!("LLM error: {e}"),
                "code": 502
            }),
        };
        if send_json(&mut socket, frame).await.is_err() {
            break;
        }
    }
    let _ = socket.send(WsMessage::Close(None)).await;
}

async fn send_json(socket: &mut WebSocket, value: serde_json::Value) -> Result<(), axum::Error> {
    socket.send(WsMessage::Text(value.to_string().into())).await
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    validate_session_id(&session_id)?;
    Ok(Json(state.responder.history(&session_id)))
}

pub async fn clear_all_history(State(state): State<AppState>) -> StatusCode {
    state.responder.clear_history(None);
    StatusCode::NO_CONTENT
}

pub async fn clear_session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_session_id(&session_id)?;
    state.responder.clear_history(Some(&session_id));
    Ok(StatusCode::NO_CONTENT)
}
