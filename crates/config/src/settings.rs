//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.segmenter.min_chunk_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.segmenter.min_chunk_length".to_string(),
                message: "Minimum chunk length must be at least 1 character".to_string(),
            });
        }

        if self.pipeline.synthesis.sample_rate < 8000 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.synthesis.sample_rate".to_string(),
                message: "Sample rate too low (minimum 8000 Hz)".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// WebSocket path for the streaming speech channel
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8100
}
fn default_ws_path() -> String {
    "/ws/tts".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            cors_enabled: default_true(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum control messages per second per connection
    #[serde(default = "default_messages_per_second")]
    pub messages_per_second: u32,

    /// Burst allowance (multiple of rate limit)
    #[serde(default = "default_burst_multiplier")]
    pub burst_multiplier: f32,
}

fn default_messages_per_second() -> u32 {
    100
}

fn default_burst_multiplier() -> f32 {
    2.0
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            messages_per_second: default_messages_per_second(),
            burst_multiplier: default_burst_multiplier(),
        }
    }
}

/// Speech pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineSettings {
    /// Text segmentation settings
    #[serde(default)]
    pub segmenter: SegmenterSettings,

    /// Synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisSettings,

    /// Acknowledgment filler settings
    #[serde(default)]
    pub filler: FillerSettings,
}

/// Text segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterSettings {
    /// Minimum chunk length in characters
    #[serde(default = "default_min_chunk_length")]
    pub min_chunk_length: usize,
}

fn default_min_chunk_length() -> usize {
    3
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            min_chunk_length: default_min_chunk_length(),
        }
    }
}

/// Synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    16000
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

/// Acknowledgment filler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillerSettings {
    /// Enable spoken acknowledgments
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum interval between acknowledgments, in milliseconds
    #[serde(default = "default_filler_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_filler_interval_ms() -> u64 {
    2000
}

impl Default for FillerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: default_filler_interval_ms(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOXSTREAM__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOXSTREAM")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
