//! Streaming speech engine
//!
//! Drives the segmenter, submits chunks to the synthesis backend, and
//! forwards audio segments the moment they are produced.

use std::sync::Arc;

use tokio::sync::mpsc;

use voxstream_core::AudioSegment;

use super::segmenter::{SegmenterConfig, StreamSegmenter};
use super::TtsBackend;
use crate::PipelineError;

/// Events emitted by the engine
#[derive(Debug, Clone)]
pub enum TtsStreamEvent {
    /// Audio segment ready to forward
    Audio(AudioSegment),
    /// A dispatched chunk finished synthesis
    ChunkComplete {
        /// The text that was synthesized
        text: String,
        /// Number of audio segments emitted
        segments: usize,
        /// Total buffered length in characters
        buffer_chars: usize,
        /// Dispatched length in characters
        dispatched_chars: usize,
    },
    /// A forced flush finished
    FlushComplete {
        /// The text that was synthesized (empty if nothing was pending)
        text: String,
        /// Number of audio segments emitted
        segments: usize,
    },
    /// Synthesis failed for one chunk
    SynthesisError {
        /// The text that failed, when known
        text: Option<String>,
        /// Backend error message
        message: String,
    },
}

/// Engine state
///
/// `Empty`: no undispatched text buffered. `Accumulating`: text buffered,
/// waiting for a trigger. `Dispatching`: a chunk's synthesis is in flight;
/// never re-entered for the same session because the engine requires
/// `&mut self` and each session task is the sole owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Empty,
    Accumulating,
    Dispatching,
}

/// What a dispatch completes as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchKind {
    Chunk,
    Flush,
}

/// Streaming speech engine for one session
pub struct SpeechStream {
    segmenter: StreamSegmenter,
    tts: Arc<dyn TtsBackend>,
    events: mpsc::Sender<TtsStreamEvent>,
    state: EngineState,
}

impl SpeechStream {
    /// Create a new engine writing events to `events`
    pub fn new(
        config: SegmenterConfig,
        tts: Arc<dyn TtsBackend>,
        events: mpsc::Sender<TtsStreamEvent>,
    ) -> Self {
        Self {
            segmenter: StreamSegmenter::new(config),
            tts,
            events,
            state: EngineState::Empty,
        }
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Append streaming text, dispatching any chunks that become ready
    ///
    /// Downstream synthesis failures are reported as events, never returned.
    pub async fn append(&mut self, text: &str) {
        self.segmenter.push(text);

        while let Some(chunk) = self.segmenter.next_chunk() {
            self.dispatch(chunk, DispatchKind::Chunk).await;
        }

        self.state = if self.segmenter.has_pending() {
            EngineState::Accumulating
        } else {
            EngineState::Empty
        };
    }

    /// Force synthesis of any buffered remainder
    ///
    /// Always emits a `FlushComplete` event, with zero segments when nothing
    /// was pending.
    pub async fn flush(&mut self) {
        match self.segmenter.take_remaining() {
            Some(text) => self.dispatch(text, DispatchKind::Flush).await,
            None => {
                let _ = self
                    .events
                    .send(TtsStreamEvent::FlushComplete {
                        text: String::new(),
                        segments: 0,
                    })
                    .await;
            }
        }

        self.state = EngineState::Empty;
    }

    /// Discard buffer state and return to `Empty`
    pub fn reset(&mut self) {
        self.segmenter.reset();
        self.state = EngineState::Empty;
        tracing::debug!("speech stream reset");
    }

    /// Synthesize one chunk, forwarding segments as they arrive
    async fn dispatch(&mut self, text: String, kind: DispatchKind) {
        self.state = EngineState::Dispatching;
        tracing::debug!(chunk = %text, "dispatching text for synthesis");

        let mut rx = match self.tts.synthesize(&text).await {
            Ok(rx) => rx,
            Err(e) => {
                self.report_failure(kind, text, e).await;
                return;
            }
        };

        let mut segments = 0usize;
        while let Some(item) = rx.recv().await {
            match item {
                Ok(segment) => {
                    segments += 1;
                    if self.events.send(TtsStreamEvent::Audio(segment)).await.is_err() {
                        tracing::debug!("event sink closed, abandoning synthesis");
                        return;
                    }
                }
                Err(e) => {
                    self.report_failure(kind, text, e).await;
                    return;
                }
            }
        }

        let completion = match kind {
            DispatchKind::Chunk => TtsStreamEvent::ChunkComplete {
                text,
                segments,
                buffer_chars: self.segmenter.buffer_chars(),
                dispatched_chars: self.segmenter.dispatched_chars(),
            },
            DispatchKind::Flush => TtsStreamEvent::FlushComplete { text, segments },
        };
        let _ = self.events.send(completion).await;
    }

    /// Report a synthesis failure and move on; the cursor has already
    /// advanced past the failed text, so it is never reprocessed.
    async fn report_failure(&self, kind: DispatchKind, text: String, error: PipelineError) {
        tracing::error!(chunk = %text, error = %error, "synthesis failed");

        let text = match kind {
            DispatchKind::Chunk => Some(text),
            DispatchKind::Flush => None,
        };
        let _ = self
            .events
            .send(TtsStreamEvent::SynthesisError {
                text,
                message: error.to_string(),
            })
            .await;
    }
}
