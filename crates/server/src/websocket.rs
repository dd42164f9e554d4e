//! WebSocket streaming speech channel
//!
//! One task per connection: inbound control messages drive the session's
//! speech engine, outbound frames interleave raw audio with JSON
//! notifications, and injected broadcast turns are spoken in place.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};

use voxstream_core::TranscriptResult;
use voxstream_pipeline::{
    AckFiller, FillerConfig, SegmenterConfig, SpeechStream, TtsStreamEvent,
};

use crate::rate_limit::RateLimiter;
use crate::registry::SessionHandle;
use crate::state::AppState;

/// Inbound control messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Append a streaming text fragment
    Text {
        #[serde(default)]
        text: String,
    },
    /// Force synthesis of any buffered remainder
    Flush,
    /// Clear buffer state
    Reset,
    /// Finalized transcript from the speech recognizer
    Transcript {
        #[serde(default)]
        text: String,
    },
}

/// Outbound notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A dispatched chunk finished synthesis
    ChunkComplete {
        text: String,
        chunks: usize,
        buffer_length: usize,
        processed_length: usize,
    },
    /// A forced flush finished
    FlushComplete { text: String, chunks: usize },
    /// Something went wrong processing one unit of input
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Buffer state was cleared
    ResetComplete,
}

/// How an inbound text payload was understood
#[derive(Debug)]
pub enum Inbound {
    /// A well-formed control message
    Control(ClientMessage),
    /// A JSON object carrying an unrecognized type tag
    Unknown(String),
    /// Anything else: treated as appended plain text
    Plain(String),
}

/// Classify an inbound payload
///
/// Valid JSON with an unknown tag is an error the peer hears about; broken
/// JSON and bare text degrade to a plain append.
pub fn parse_inbound(raw: &str) -> Inbound {
    if !raw.trim_start().starts_with('{') {
        return Inbound::Plain(raw.to_string());
    }

    match serde_json::from_str::<ClientMessage>(raw) {
        Ok(msg) => Inbound::Control(msg),
        Err(_) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => match value.get("type").and_then(|t| t.as_str()) {
                Some(kind) => Inbound::Unknown(kind.to_string()),
                None => Inbound::Plain(raw.to_string()),
            },
            Err(_) => Inbound::Plain(raw.to_string()),
        },
    }
}

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// WebSocket handler
pub struct WebSocketHandler;

impl WebSocketHandler {
    /// Handle WebSocket upgrade
    pub async fn handle(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
        ws.on_upgrade(move |socket| Self::handle_socket(socket, state))
    }

    /// Handle one WebSocket connection for its whole lifetime
    async fn handle_socket(socket: WebSocket, state: AppState) {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session_id = %session_id, "client connected to streaming speech channel");

        let (sender, receiver) = socket.split();
        let sender: WsSender = Arc::new(Mutex::new(sender));

        // Engine events -> transport frames
        let (event_tx, event_rx) = mpsc::channel::<TtsStreamEvent>(64);
        let forwarder = tokio::spawn(Self::forward_events(event_rx, sender.clone()));

        // Broadcast turns injected through the registry
        let (turn_tx, turn_rx) = mpsc::channel::<String>(8);
        state.registry.register(session_id.clone(), SessionHandle::new(turn_tx));

        let engine = SpeechStream::new(
            SegmenterConfig {
                min_chunk_length: state.config.pipeline.segmenter.min_chunk_length,
            },
            state.tts.clone(),
            event_tx.clone(),
        );
        let filler = AckFiller::new(FillerConfig {
            enabled: state.config.pipeline.filler.enabled,
            min_interval: Duration::from_millis(state.config.pipeline.filler.min_interval_ms),
        });

        Self::session_loop(&state, &session_id, receiver, &sender, engine, filler, event_tx, turn_rx)
            .await;

        state.registry.unregister(&session_id);
        forwarder.abort();
        tracing::info!(session_id = %session_id, "client disconnected from streaming speech channel");
    }

    /// Drive one session until the peer goes away
    #[allow(clippy::too_many_arguments)]
    async fn session_loop(
        state: &AppState,
        session_id: &str,
        mut receiver: SplitStream<WebSocket>,
        sender: &WsSender,
        mut engine: SpeechStream,
        mut filler: AckFiller,
        event_tx: mpsc::Sender<TtsStreamEvent>,
        mut turn_rx: mpsc::Receiver<String>,
    ) {
        let mut rate_limiter = RateLimiter::new(state.config.server.rate_limit.clone());

        loop {
            tokio::select! {
                inbound = receiver.next() => {
                    match inbound {
                        Some(Ok(Message::Text(raw))) => {
                            if let Err(e) = rate_limiter.check_message() {
                                tracing::warn!(session_id = %session_id, "rate limit exceeded");
                                Self::send_control(sender, &ServerMessage::Error {
                                    error: e.to_string(),
                                    text: None,
                                }).await;
                                continue;
                            }

                            Self::handle_text(
                                &raw, state, session_id, sender, &mut engine, &mut filler, &event_tx,
                            ).await;
                        }
                        Some(Ok(Message::Binary(_))) => {
                            tracing::debug!(session_id = %session_id, "ignoring inbound binary frame");
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let mut s = sender.lock().await;
                            let _ = s.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!(session_id = %session_id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }
                injected = turn_rx.recv() => {
                    match injected {
                        Some(message) => {
                            tracing::info!(session_id = %session_id, "speaking injected system message");
                            engine.append(&message).await;
                            engine.flush().await;
                        }
                        // Registry entry replaced; this session can no longer be reached.
                        None => {
                            tracing::warn!(session_id = %session_id, "turn channel closed, ending session");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Handle one inbound text payload
    async fn handle_text(
        raw: &str,
        state: &AppState,
        session_id: &str,
        sender: &WsSender,
        engine: &mut SpeechStream,
        filler: &mut AckFiller,
        event_tx: &mpsc::Sender<TtsStreamEvent>,
    ) {
        match parse_inbound(raw) {
            Inbound::Control(ClientMessage::Text { text }) => {
                if !text.is_empty() {
                    engine.append(&text).await;
                }
            }
            Inbound::Control(ClientMessage::Flush) => engine.flush().await,
            Inbound::Control(ClientMessage::Reset) => {
                engine.reset();
                Self::send_control(sender, &ServerMessage::ResetComplete).await;
            }
            Inbound::Control(ClientMessage::Transcript { text }) => {
                Self::handle_transcript(&text, state, session_id, filler, event_tx).await;
            }
            Inbound::Unknown(kind) => {
                Self::send_control(sender, &ServerMessage::Error {
                    error: format!("Unknown message type: {}", kind),
                    text: None,
                }).await;
            }
            Inbound::Plain(text) => engine.append(&text).await,
        }
    }

    /// React to a finalized transcript with a throttled spoken acknowledgment
    ///
    /// The transcript itself is never consumed here; the conversation side of
    /// the channel already has it.
    async fn handle_transcript(
        text: &str,
        state: &AppState,
        session_id: &str,
        filler: &mut AckFiller,
        event_tx: &mpsc::Sender<TtsStreamEvent>,
    ) {
        let transcript = TranscriptResult::final_result(text, 1.0);
        if transcript.is_empty() {
            return;
        }

        let phrase = match filler.acknowledge(&transcript.text) {
            Some(phrase) => phrase,
            None => {
                if AckFiller::is_backchannel(&transcript.text) {
                    tracing::debug!(session_id = %session_id, "backchannel utterance, staying quiet");
                }
                return;
            }
        };
        tracing::debug!(session_id = %session_id, phrase = %phrase, "speaking acknowledgment");

        match state.tts.synthesize(&phrase).await {
            Ok(mut rx) => {
                while let Some(item) = rx.recv().await {
                    match item {
                        Ok(segment) => {
                            if event_tx.send(TtsStreamEvent::Audio(segment)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(session_id = %session_id, error = %e, "acknowledgment synthesis failed");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "acknowledgment synthesis failed");
            }
        }
    }

    /// Forward engine events to the peer as audio and notification frames
    async fn forward_events(mut event_rx: mpsc::Receiver<TtsStreamEvent>, sender: WsSender) {
        while let Some(event) = event_rx.recv().await {
            let frame = match event {
                TtsStreamEvent::Audio(segment) => Message::Binary(segment.data),
                TtsStreamEvent::ChunkComplete {
                    text,
                    segments,
                    buffer_chars,
                    dispatched_chars,
                } => Self::json_frame(&ServerMessage::ChunkComplete {
                    text,
                    chunks: segments,
                    buffer_length: buffer_chars,
                    processed_length: dispatched_chars,
                }),
                TtsStreamEvent::FlushComplete { text, segments } => {
                    Self::json_frame(&ServerMessage::FlushComplete { text, chunks: segments })
                }
                TtsStreamEvent::SynthesisError { text, message } => {
                    Self::json_frame(&ServerMessage::Error { error: message, text })
                }
            };

            let mut s = sender.lock().await;
            if s.send(frame).await.is_err() {
                break;
            }
        }
    }

    fn json_frame(msg: &ServerMessage) -> Message {
        Message::Text(serde_json::to_string(msg).unwrap())
    }

    /// Send a control notification directly to the peer
    async fn send_control(sender: &WsSender, msg: &ServerMessage) {
        let mut s = sender.lock().await;
        if let Err(e) = s.send(Self::json_frame(msg)).await {
            tracing::debug!(error = %e, "failed to send control message");
        }
    }
}
