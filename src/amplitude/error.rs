//! Error types for the amplitude pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn an audio file into samples.
///
/// Terminal for the envelope computation that hit it: the envelope for that
/// file is never produced and the caller shows a failure state instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to read samples from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format in {path}: {details}")]
    UnsupportedFormat { path: PathBuf, details: String },

    #[error("Waveform computation was interrupted: {0}")]
    Interrupted(String),
}

/// The live capture source could not report a power level.
///
/// Never surfaced past the meter, which substitutes a silent reading.
#[derive(Debug, Clone, Error)]
#[error("Audio source unavailable: {reason}")]
pub struct SourceUnavailable {
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Invalid normalization configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("min_db ({min_db}) must be lower than max_db ({max_db})")]
    InvertedRange { min_db: f32, max_db: f32 },

    #[error("curve exponent must be a positive number, got {0}")]
    InvalidExponent(f32),

    #[error("floor must be in [0, 1), got {0}")]
    InvalidFloor(f32),

    #[error("decibel bounds must be finite numbers")]
    NonFiniteBounds,
}
