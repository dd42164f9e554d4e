//! Streaming speech pipeline
//!
//! This crate provides the core streaming components:
//! - Incremental text segmentation for low-latency synthesis
//! - The speech-synthesis backend seam (with a built-in silence backend)
//! - Throttled spoken acknowledgments for recognized speech

pub mod filler;
pub mod tts;

// Filler exports
pub use filler::{AckFiller, FillerCategory, FillerConfig};

// TTS exports
pub use tts::{
    EngineState, SegmenterConfig, SilenceTts, SpeechStream, StreamSegmenter, TtsBackend,
    TtsStreamEvent,
};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("TTS error: {0}")]
    Tts(String),
}
