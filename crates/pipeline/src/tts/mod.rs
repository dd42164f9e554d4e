//! Streaming Text-to-Speech
//!
//! Features:
//! - Incremental segmentation of an open-ended text stream
//! - Segment-by-segment audio delivery for early emission
//! - Pluggable synthesis backend

mod segmenter;
mod streaming;

pub use segmenter::{SegmenterConfig, StreamSegmenter};
pub use streaming::{EngineState, SpeechStream, TtsStreamEvent};

use tokio::sync::mpsc;

use voxstream_core::AudioSegment;

use crate::PipelineError;

/// TTS backend trait
///
/// A backend turns one text chunk into a finite, ordered, lazy sequence of
/// audio segments. The sequence may fail partway through; consumers see the
/// error as an item and stop pulling.
#[async_trait::async_trait]
pub trait TtsBackend: Send + Sync {
    /// Begin synthesis of `text`
    async fn synthesize(
        &self,
        text: &str,
    ) -> Result<mpsc::Receiver<Result<AudioSegment, PipelineError>>, PipelineError>;

    /// Get sample rate
    fn sample_rate(&self) -> u32;
}

/// Silence-producing backend
///
/// Emits zeroed 16-bit PCM sized to the chunk (~50ms of audio per character,
/// delivered in ~100ms segments). Used when no synthesis service is wired up
/// and throughout the test suite.
pub struct SilenceTts {
    sample_rate: u32,
}

impl SilenceTts {
    /// Create a new silence backend
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

#[async_trait::async_trait]
impl TtsBackend for SilenceTts {
    async fn synthesize(
        &self,
        text: &str,
    ) -> Result<mpsc::Receiver<Result<AudioSegment, PipelineError>>, PipelineError> {
        let total_samples = text.chars().count() * (self.sample_rate as usize / 20);
        let segment_samples = (self.sample_rate as usize / 10).max(1);
        let sample_rate = self.sample_rate;

        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            let mut remaining = total_samples;
            while remaining > 0 {
                let n = remaining.min(segment_samples);
                let segment = AudioSegment::new(vec![0u8; n * 2], sample_rate);
                if tx.send(Ok(segment)).await.is_err() {
                    break;
                }
                remaining -= n;
            }
        });

        Ok(rx)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silence_segments() {
        let tts = SilenceTts::new(16000);
        // 4 chars at 800 samples/char = 3200 samples, in 1600-sample segments
        let mut rx = tts.synthesize("abcd").await.unwrap();

        let mut segments = 0;
        let mut bytes = 0;
        while let Some(item) = rx.recv().await {
            let seg = item.unwrap();
            bytes += seg.data.len();
            segments += 1;
        }

        assert_eq!(segments, 2);
        assert_eq!(bytes, 6400);
    }

    #[tokio::test]
    async fn test_silence_empty_text() {
        let tts = SilenceTts::new(16000);
        let mut rx = tts.synthesize("").await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
