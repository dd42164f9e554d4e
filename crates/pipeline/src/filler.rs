//! Spoken acknowledgments for recognized speech
//!
//! Gives the user near-instant audible feedback that their utterance was
//! heard, before the slower language-model round trip completes, without
//! overwhelming them with sound.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Filler configuration
#[derive(Debug, Clone)]
pub struct FillerConfig {
    /// Enable spoken acknowledgments
    pub enabled: bool,
    /// Minimum interval between emitted acknowledgments
    pub min_interval: Duration,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: Duration::from_millis(2000),
        }
    }
}

/// Topical category of a recognized utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillerCategory {
    /// Temperature and climate control
    Climate,
    /// Fan and airflow
    Airflow,
    /// Windshield and defrost
    Defrost,
    /// Navigation and directions
    Navigation,
}

const CLIMATE_KEYWORDS: &[&str] = &[
    "temperature",
    "temp",
    "hot",
    "cold",
    "climate",
    " ac ",
    "warmer",
    "cooler",
    "heat",
    "cool",
    "air conditioning",
    "a/c",
    "aircon",
    "air con",
];

const AIRFLOW_KEYWORDS: &[&str] = &["fan", "air", "blow", "blower", "windy", "breeze", "airflow"];

const DEFROST_KEYWORDS: &[&str] = &["defrost", "windshield", "window", "front", "glass", "ice"];

const NAVIGATION_KEYWORDS: &[&str] = &["navigate", "directions", "map", "route"];

const CLIMATE_PHRASES: &[&str] = &[
    "Let me check the temperature.",
    "I'll look into the temperature settings.",
    "Just a second, checking temp.",
    "Let me adjust that for you.",
    "Hang tight, I'm on it.",
    "One moment, please.",
    "Let me take a quick look.",
    "Checking temperature now.",
    "Give me a moment.",
];

const AIRFLOW_PHRASES: &[&str] = &[
    "I'll adjust the fan for you.",
    "Let me help with the airflow.",
    "Adjusting the air now.",
    "One sec, working on it.",
    "Fan settings coming up.",
    "Making the air better.",
    "Got it, changing airflow.",
    "I'll get on that.",
];

const DEFROST_PHRASES: &[&str] = &[
    "I'll check the defrost settings.",
    "Let me help with the windshield.",
    "I'll fix that for you.",
    "Just a second.",
    "Hang on, working on it.",
    "Let me take care of that.",
    "Working on the front glass.",
];

const NAVIGATION_PHRASES: &[&str] = &[
    "I'll help you with navigation.",
    "Let me get those directions.",
    "Finding the best route.",
    "Hold on, checking the map.",
    "Let me plan that out.",
    "One sec, mapping now.",
    "Got it, setting your route.",
    "Loading directions.",
    "Hang tight, getting the map.",
    "I'll guide you there.",
];

/// Content-free backchannel words that never deserve a spoken reply
const BACKCHANNEL_WORDS: &[&str] = &[
    "hey", "uh", "hmm", "mmm", "um", "ah", "well", "thanks", "hello", "good", "bye", "goodbye",
    "great",
];

const BACKCHANNEL_PHRASES: &[&str] = &["great thanks", "okay great thank you", "okay great"];

/// Throttled acknowledgment generator for one session
///
/// The cooldown is per session by construction: each session owns its own
/// filler, so one user's cadence never throttles another's.
pub struct AckFiller {
    config: FillerConfig,
    /// When the last acknowledgment was actually emitted
    last_emitted: Option<Instant>,
    rng: StdRng,
}

impl AckFiller {
    /// Create a new filler with entropy-seeded phrase selection
    pub fn new(config: FillerConfig) -> Self {
        Self {
            config,
            last_emitted: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a filler with a fixed seed for reproducible selection
    pub fn with_seed(config: FillerConfig, seed: u64) -> Self {
        Self {
            config,
            last_emitted: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Process one finalized transcript, returning a phrase to speak, if any
    ///
    /// The cooldown timestamp moves only when a phrase is returned; calls
    /// suppressed by the interval check or by classification leave it alone.
    /// The transcript itself is never consumed here; the caller forwards it
    /// unchanged.
    pub fn acknowledge(&mut self, text: &str) -> Option<String> {
        if !self.config.enabled || text.trim().is_empty() {
            return None;
        }

        if let Some(last) = self.last_emitted {
            if last.elapsed() < self.config.min_interval {
                return None;
            }
        }

        let category = Self::classify(text)?;
        let pool = Self::phrases(category);
        let phrase = pool[self.rng.gen_range(0..pool.len())];

        self.last_emitted = Some(Instant::now());
        Some(phrase.to_string())
    }

    /// Classify an utterance into a topical category
    ///
    /// Backchannel noise (bare acknowledgment words, purely alphabetic
    /// single tokens, short thanks-phrases) and anything else unrecognized
    /// map to `None` and stay silent.
    pub fn classify(text: &str) -> Option<FillerCategory> {
        let lower = text.to_lowercase();

        if CLIMATE_KEYWORDS.iter().any(|w| lower.contains(w)) {
            return Some(FillerCategory::Climate);
        }
        if AIRFLOW_KEYWORDS.iter().any(|w| lower.contains(w)) {
            return Some(FillerCategory::Airflow);
        }
        if DEFROST_KEYWORDS.iter().any(|w| lower.contains(w)) {
            return Some(FillerCategory::Defrost);
        }
        if NAVIGATION_KEYWORDS.iter().any(|w| lower.contains(w)) {
            return Some(FillerCategory::Navigation);
        }

        None
    }

    /// Whether an utterance is content-free backchannel noise
    pub fn is_backchannel(text: &str) -> bool {
        let lower = text.to_lowercase();
        let trimmed = lower.trim();

        BACKCHANNEL_WORDS.contains(&trimmed)
            || (!trimmed.is_empty() && trimmed.chars().all(|c| c.is_alphabetic()))
            || BACKCHANNEL_PHRASES.iter().any(|p| lower.contains(p))
    }

    /// Phrase pool for a category
    fn phrases(category: FillerCategory) -> &'static [&'static str] {
        match category {
            FillerCategory::Climate => CLIMATE_PHRASES,
            FillerCategory::Airflow => AIRFLOW_PHRASES,
            FillerCategory::Defrost => DEFROST_PHRASES,
            FillerCategory::Navigation => NAVIGATION_PHRASES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler() -> AckFiller {
        AckFiller::with_seed(FillerConfig::default(), 7)
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            AckFiller::classify("it's too hot in here"),
            Some(FillerCategory::Climate)
        );
        assert_eq!(
            AckFiller::classify("turn the fan up"),
            Some(FillerCategory::Airflow)
        );
        assert_eq!(
            AckFiller::classify("the windshield is fogging"),
            Some(FillerCategory::Defrost)
        );
        assert_eq!(
            AckFiller::classify("navigate to downtown"),
            Some(FillerCategory::Navigation)
        );
        assert_eq!(AckFiller::classify("tell me a joke 123"), None);
    }

    #[test]
    fn test_backchannel_is_silent() {
        assert!(AckFiller::is_backchannel("thanks"));
        assert!(AckFiller::is_backchannel("okay great thank you"));

        let mut filler = filler();
        assert!(filler.acknowledge("thanks").is_none());
        // A silent call never consumes the cooldown
        assert!(filler.acknowledge("set the temperature to 20").is_some());
    }

    #[test]
    fn test_cooldown_limits_rate() {
        let mut filler = filler();

        // Two transcripts in quick succession: at most one acknowledgment
        assert!(filler.acknowledge("make it cooler please").is_some());
        assert!(filler.acknowledge("turn on the fan").is_none());
    }

    #[test]
    fn test_cooldown_expires() {
        let config = FillerConfig {
            enabled: true,
            min_interval: Duration::from_millis(20),
        };
        let mut filler = AckFiller::with_seed(config, 7);

        assert!(filler.acknowledge("make it warmer").is_some());
        std::thread::sleep(Duration::from_millis(30));
        assert!(filler.acknowledge("turn on the fan").is_some());
    }

    #[test]
    fn test_suppressed_call_does_not_reset_cooldown() {
        let mut filler = filler();

        // Unclassified text is silent and leaves the cooldown untouched
        assert!(filler.acknowledge("tell me a joke 123").is_none());
        assert!(filler.acknowledge("set the temperature to 20").is_some());
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut filler = filler();
        assert!(filler.acknowledge("").is_none());
        assert!(filler.acknowledge("   ").is_none());
    }

    #[test]
    fn test_disabled_filler() {
        let config = FillerConfig {
            enabled: false,
            ..Default::default()
        };
        let mut filler = AckFiller::with_seed(config, 7);
        assert!(filler.acknowledge("it's freezing cold").is_none());
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let mut a = AckFiller::with_seed(FillerConfig::default(), 42);
        let mut b = AckFiller::with_seed(FillerConfig::default(), 42);

        assert_eq!(
            a.acknowledge("check the temperature"),
            b.acknowledge("check the temperature")
        );
    }

    #[test]
    fn test_phrase_comes_from_category_pool() {
        let mut filler = filler();
        let phrase = filler.acknowledge("find me a route home").unwrap();
        assert!(NAVIGATION_PHRASES.contains(&phrase.as_str()));
    }
}
