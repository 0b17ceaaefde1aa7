//! Audio analysis for keybpm
//!
//! Provides chromagram extraction, Krumhansl-Schmuckler key estimation,
//! spectral-flux tempo estimation, and the analyzer that combines them.

mod analyzer;
mod chroma;
mod config;
mod error;
mod key;
mod pitch;
mod report;
mod tempo;
mod waveform;

pub use analyzer::TrackAnalyzer;
pub use chroma::{ChromaExtractor, StftChroma};
pub use config::{AnalysisConfig, ChromaConfig, TempoConfig};
pub use error::AnalysisError;
pub use key::{best_candidate, key_profile, pearson, rotate_profile, KeyCandidate, KeyEstimator};
pub use pitch::{Key, Mode, PitchClass, PITCH_CLASSES};
pub use report::{round_bpm, Estimate, TrackReport, NOT_AVAILABLE};
pub use tempo::{SpectralFluxTempo, TempoEstimator};
pub use waveform::{ChromaFrame, Chromagram, Waveform};
