//! Incremental text segmentation
//!
//! Splits a growing text stream into speakable chunks for early synthesis.

/// Sentence-terminating punctuation (Latin and CJK)
const SENTENCE_ENDINGS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Pause punctuation (Latin and CJK, plus newline)
const PAUSE_MARKS: [char; 5] = [',', ';', '，', '；', '\n'];

fn is_sentence_ending(c: char) -> bool {
    SENTENCE_ENDINGS.contains(&c)
}

fn is_pause_mark(c: char) -> bool {
    PAUSE_MARKS.contains(&c)
}

/// Segmenter configuration
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum chunk length in characters
    pub min_chunk_length: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self { min_chunk_length: 3 }
    }
}

/// Incremental segmenter for streaming TTS
///
/// Owns an append-only buffer and a cursor marking how much has been
/// dispatched. The buffer is never truncated, only appended to and
/// eventually reset between turns.
pub struct StreamSegmenter {
    config: SegmenterConfig,
    /// Accumulated text
    buffer: String,
    /// Byte offset of dispatched text; always on a char boundary
    dispatched: usize,
}

impl StreamSegmenter {
    /// Create a new segmenter
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            dispatched: 0,
        }
    }

    /// Append text to the buffer
    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Extract the next ready chunk, if any
    ///
    /// Evaluates the trigger policy on the undispatched span and cuts at the
    /// best boundary. Whitespace-only spans advance the cursor without
    /// producing a chunk. Call in a loop to drain everything ready.
    pub fn next_chunk(&mut self) -> Option<String> {
        loop {
            let pending = &self.buffer[self.dispatched..];
            if pending.is_empty() || !self.is_ready(pending) {
                return None;
            }

            let cut = self.cut_point(pending);
            let chunk = pending[..cut].trim().to_string();
            self.dispatched += cut;

            if !chunk.is_empty() {
                return Some(chunk);
            }
            // Whitespace-only span consumed; keep scanning.
        }
    }

    /// Whether the undispatched span should be dispatched now
    fn is_ready(&self, pending: &str) -> bool {
        if pending.chars().any(is_sentence_ending) {
            return true;
        }

        let chars = pending.chars().count();
        if pending.chars().any(is_pause_mark) && chars >= self.config.min_chunk_length {
            return true;
        }

        chars >= self.config.min_chunk_length * 2
    }

    /// Byte offset of the best cut point within the undispatched span
    ///
    /// Prefers the first sentence terminator, then the first pause mark at or
    /// past the minimum chunk length, then the end of the span.
    fn cut_point(&self, pending: &str) -> usize {
        for (idx, ch) in pending.char_indices() {
            if is_sentence_ending(ch) {
                return idx + ch.len_utf8();
            }
        }

        for (pos, (idx, ch)) in pending.char_indices().enumerate() {
            if is_pause_mark(ch) && pos >= self.config.min_chunk_length {
                return idx + ch.len_utf8();
            }
        }

        pending.len()
    }

    /// Take the trimmed remainder, advancing the cursor to the end
    ///
    /// Returns `None` when nothing but whitespace is pending.
    pub fn take_remaining(&mut self) -> Option<String> {
        let remaining = self.buffer[self.dispatched..].trim().to_string();
        self.dispatched = self.buffer.len();

        if remaining.is_empty() {
            None
        } else {
            Some(remaining)
        }
    }

    /// Reset to the initial empty state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.dispatched = 0;
    }

    /// Total buffered length in characters
    pub fn buffer_chars(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Dispatched length in characters
    pub fn dispatched_chars(&self) -> usize {
        self.buffer[..self.dispatched].chars().count()
    }

    /// Whether undispatched text remains
    pub fn has_pending(&self) -> bool {
        self.dispatched < self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> StreamSegmenter {
        StreamSegmenter::new(SegmenterConfig::default())
    }

    #[test]
    fn test_sentence_dispatched_as_one_chunk() {
        let mut seg = segmenter();
        seg.push("Hello world, how are you?");

        // The sentence terminator wins over the comma
        assert_eq!(seg.next_chunk().unwrap(), "Hello world, how are you?");
        assert!(seg.next_chunk().is_none());
    }

    #[test]
    fn test_short_fragment_waits_for_more() {
        let mut seg = segmenter();
        seg.push("Hi");
        assert!(seg.next_chunk().is_none());

        seg.push(" there, ");
        // Pause mark with enough length: cut right after the comma
        assert_eq!(seg.next_chunk().unwrap(), "Hi there,");
        assert!(seg.next_chunk().is_none());
    }

    #[test]
    fn test_unpunctuated_text_dispatches_in_windows() {
        let mut seg = segmenter();
        seg.push("onetwo");
        // Double the minimum length with no punctuation: whole span
        assert_eq!(seg.next_chunk().unwrap(), "onetwo");

        seg.push("three");
        assert!(seg.next_chunk().is_none());
        seg.push("four");
        assert_eq!(seg.next_chunk().unwrap(), "threefour");
    }

    #[test]
    fn test_early_pause_mark_cuts_at_span_end() {
        let mut seg = segmenter();
        // Pause at char 1 (< minimum), no later pause: whole span
        seg.push("a, b");
        assert_eq!(seg.next_chunk().unwrap(), "a, b");
    }

    #[test]
    fn test_cjk_terminators() {
        let mut seg = segmenter();
        seg.push("你好世界。再見");
        assert_eq!(seg.next_chunk().unwrap(), "你好世界。");
        assert!(seg.next_chunk().is_none());

        assert_eq!(seg.take_remaining().unwrap(), "再見");
    }

    #[test]
    fn test_multiple_sentences_drain_in_order() {
        let mut seg = segmenter();
        seg.push("One. Two! Three?");

        assert_eq!(seg.next_chunk().unwrap(), "One.");
        assert_eq!(seg.next_chunk().unwrap(), "Two!");
        assert_eq!(seg.next_chunk().unwrap(), "Three?");
        assert!(seg.next_chunk().is_none());
    }

    #[test]
    fn test_whitespace_span_advances_without_chunk() {
        let mut seg = segmenter();
        seg.push("      ");
        assert!(seg.next_chunk().is_none());
        assert!(!seg.has_pending());
        assert_eq!(seg.dispatched_chars(), 6);
    }

    #[test]
    fn test_take_remaining_empty() {
        let mut seg = segmenter();
        assert!(seg.take_remaining().is_none());

        seg.push("  ");
        assert!(seg.take_remaining().is_none());
        assert!(!seg.has_pending());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut seg = segmenter();
        seg.push("Some text.");
        let _ = seg.next_chunk();
        seg.reset();

        assert_eq!(seg.buffer_chars(), 0);
        assert_eq!(seg.dispatched_chars(), 0);
        assert!(seg.next_chunk().is_none());
    }

    #[test]
    fn test_concatenation_preserves_text() {
        let mut seg = segmenter();
        let parts = ["Turn", " the", " temperature up, ", "please. ", "And the", " fan too"];
        let mut chunks = Vec::new();

        for part in parts {
            seg.push(part);
            while let Some(chunk) = seg.next_chunk() {
                chunks.push(chunk);
            }
        }
        if let Some(rest) = seg.take_remaining() {
            chunks.push(rest);
        }

        let original: String = parts.concat();
        let rejoined: String = chunks.join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&original), normalize(&rejoined));
    }
}
