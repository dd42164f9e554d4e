//! Transcript types for recognized speech

use serde::{Deserialize, Serialize};

/// A transcription result from the speech-recognition collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Transcribed text
    pub text: String,

    /// Is this a final result?
    pub is_final: bool,

    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl TranscriptResult {
    /// Create a new transcript result
    pub fn new(text: impl Into<String>, is_final: bool, confidence: f32) -> Self {
        Self {
            text: text.into(),
            is_final,
            confidence,
        }
    }

    /// Create a partial (non-final) transcript
    pub fn partial(text: impl Into<String>, confidence: f32) -> Self {
        Self::new(text, false, confidence)
    }

    /// Create a final transcript
    pub fn final_result(text: impl Into<String>, confidence: f32) -> Self {
        Self::new(text, true, confidence)
    }

    /// Check if the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl Default for TranscriptResult {
    fn default() -> Self {
        Self {
            text: String::new(),
            is_final: false,
            confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_result() {
        let result = TranscriptResult::final_result("turn up the heat", 0.95);
        assert!(result.is_final);
        assert_eq!(result.word_count(), 4);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_whitespace_is_empty() {
        let result = TranscriptResult::partial("   ", 0.2);
        assert!(result.is_empty());
    }
}
