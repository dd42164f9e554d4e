//! Core types for the voxstream speech server
//!
//! This crate provides foundational types used across all other crates:
//! - Audio segment types
//! - Transcript types

pub mod audio;
pub mod transcript;

pub use audio::AudioSegment;
pub use transcript::TranscriptResult;
