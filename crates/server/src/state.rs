//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use voxstream_config::Settings;
use voxstream_pipeline::{SilenceTts, TtsBackend};

use crate::registry::SessionRegistry;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Session registry
    pub registry: Arc<SessionRegistry>,
    /// Speech-synthesis backend shared by all sessions
    pub tts: Arc<dyn TtsBackend>,
}

impl AppState {
    /// Create application state with the built-in silence backend
    pub fn new(config: Settings) -> Self {
        let tts = Arc::new(SilenceTts::new(config.pipeline.synthesis.sample_rate));
        Self::with_backend(config, tts)
    }

    /// Create application state with a specific synthesis backend
    pub fn with_backend(config: Settings, tts: Arc<dyn TtsBackend>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(SessionRegistry::new()),
            tts,
        }
    }
}
