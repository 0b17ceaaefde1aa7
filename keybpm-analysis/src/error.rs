//! Error types for analysis

use thiserror::Error;

/// Errors that can occur while analyzing a waveform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
