//! HTTP Endpoints
//!
//! REST API surrounding the streaming speech channel.

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::websocket::WebSocketHandler;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_enabled = state.config.server.cors_enabled;
    let ws_path = state.config.server.ws_path.clone();

    let mut router = Router::new()
        // Streaming speech channel
        .route(&ws_path, get(ws_handler))

        // Operator event fan-out
        .route("/api/event/broadcast", post(broadcast_message))

        // Session observability
        .route("/api/sessions", get(list_sessions))

        // Service self-description
        .route("/tts/info", get(streaming_tts_info))

        // Health check
        .route("/health", get(health_check))

        // Middleware
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

/// Broadcast request body
#[derive(Debug, Deserialize)]
struct EventMessage {
    message: String,
}

/// Broadcast a message to all active sessions
async fn broadcast_message(
    State(state): State<AppState>,
    Json(event): Json<EventMessage>,
) -> Json<serde_json::Value> {
    if state.registry.count() == 0 {
        return Json(serde_json::json!({ "status": "no_active_streams" }));
    }

    let sent = state.registry.broadcast(&event.message);
    tracing::info!(sent, "broadcast delivered");

    Json(serde_json::json!({
        "status": "success",
        "sent_to": sent,
    }))
}

/// List live sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.registry.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Describe the streaming speech service
async fn streaming_tts_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Voxstream Streaming TTS",
        "websocket_endpoint": state.config.server.ws_path,
        "sample_rate": state.tts.sample_rate(),
        "features": [
            "Real-time incremental TTS",
            "Intelligent text chunking",
            "Streaming audio output",
            "Buffer management",
        ],
        "message_types": {
            "text": { "type": "text", "text": "Your streaming text here" },
            "flush": { "type": "flush" },
            "reset": { "type": "reset" },
            "transcript": { "type": "transcript", "text": "Finalized user speech" },
        },
        "usage_example": {
            "description": "Send streaming text chunks as they arrive from chat completion",
            "example": [
                { "type": "text", "text": "Hello" },
                { "type": "text", "text": " world" },
                { "type": "text", "text": "!" },
                { "type": "flush" },
            ],
        },
    }))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.registry.count(),
    }))
}

/// WebSocket handler wrapper
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    WebSocketHandler::handle(ws, State(state)).await
}
