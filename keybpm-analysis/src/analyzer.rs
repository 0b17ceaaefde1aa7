//! Runs tempo and key estimation over a decoded waveform

use crate::chroma::{ChromaExtractor, StftChroma};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::key::KeyEstimator;
use crate::report::{round_bpm, Estimate, TrackReport};
use crate::tempo::{SpectralFluxTempo, TempoEstimator};
use crate::waveform::Waveform;
use tracing::{debug, info};

/// Sequences tempo estimation, chroma extraction and key estimation
///
/// The collaborators are generic so tests can substitute stubs.
pub struct TrackAnalyzer<T = SpectralFluxTempo, C = StftChroma> {
    config: AnalysisConfig,
    tempo: T,
    chroma: C,
    key: KeyEstimator,
}

impl TrackAnalyzer {
    /// Analyzer with the built-in collaborators configured from `config`
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let tempo = SpectralFluxTempo::new(config.tempo.clone());
        let chroma = StftChroma::new(config.chroma.clone());
        Self::with_collaborators(config, tempo, chroma)
    }
}

impl<T: TempoEstimator, C: ChromaExtractor> TrackAnalyzer<T, C> {
    pub fn with_collaborators(
        config: AnalysisConfig,
        tempo: T,
        chroma: C,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            tempo,
            chroma,
            key: KeyEstimator::new(),
        })
    }

    /// Estimate tempo and key
    ///
    /// Clips shorter than `min_tempo_duration_secs` get no tempo and the tempo
    /// estimator is not called.
    pub fn analyze(&self, waveform: &Waveform) -> Result<TrackReport, AnalysisError> {
        let duration = waveform.duration_secs();

        let bpm = if duration < self.config.min_tempo_duration_secs {
            debug!(duration, "clip too short for tempo estimation");
            Estimate::NotAvailable
        } else {
            match self.tempo.estimate_tempo(waveform) {
                Some(raw) => round_bpm(raw),
                None => Estimate::NotAvailable,
            }
        };

        let chromagram = self.chroma.extract(waveform)?;
        let key = Estimate::from(self.key.estimate(&chromagram));

        info!(%bpm, %key, duration, "analysis complete");
        Ok(TrackReport::new(bpm, key))
    }
}
