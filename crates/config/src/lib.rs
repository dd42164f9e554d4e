//! Configuration for the voxstream speech server
//!
//! Settings are layered: `config/default` file, then an optional
//! environment-specific file, then `VOXSTREAM__`-prefixed environment
//! variables.

mod settings;

pub use settings::{
    load_settings, FillerSettings, ObservabilityConfig, PipelineSettings, RateLimitConfig,
    SegmenterSettings, ServerConfig, Settings, SynthesisSettings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
