//! Configuration parameters for tempo and key analysis

use crate::error::AnalysisError;

/// Chromagram extraction parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaConfig {
    /// FFT frame size in samples (default: 4096)
    pub fft_size: usize,
    /// Hop between consecutive frames in samples (default: 2048, 50% overlap)
    pub hop_size: usize,
    /// Lowest frequency mapped to a pitch class in Hz (default: 55.0, A1)
    pub min_freq: f32,
    /// Highest frequency mapped to a pitch class in Hz (default: 4000.0)
    pub max_freq: f32,
    /// Tuning reference for A4 in Hz (default: 440.0)
    pub tuning_freq: f32,
    /// Scale every frame by its maximum bin (default: true)
    pub normalize_frames: bool,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            hop_size: 2048,
            min_freq: 55.0,
            max_freq: 4000.0,
            tuning_freq: 440.0,
            normalize_frames: true,
        }
    }
}

/// Tempo estimation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TempoConfig {
    /// FFT frame size for the onset envelope (default: 2048)
    pub fft_size: usize,
    /// Hop size for the onset envelope (default: 512, ~11.6ms at 44.1kHz)
    pub hop_size: usize,
    /// Slowest tempo searched by autocorrelation (default: 60.0)
    pub min_bpm: f32,
    /// Fastest tempo searched by autocorrelation (default: 200.0)
    pub max_bpm: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            min_bpm: 60.0,
            max_bpm: 200.0,
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Clips shorter than this (in seconds) skip tempo estimation (default: 2.0)
    pub min_tempo_duration_secs: f64,
    pub chroma: ChromaConfig,
    pub tempo: TempoConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_tempo_duration_secs: 2.0,
            chroma: ChromaConfig::default(),
            tempo: TempoConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check that the parameters are usable together
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.min_tempo_duration_secs >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_tempo_duration_secs must be non-negative, got {}",
                self.min_tempo_duration_secs
            )));
        }

        let chroma = &self.chroma;
        if chroma.fft_size < 2 || chroma.hop_size == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "chroma frames need fft_size >= 2 and hop_size > 0, got {}/{}",
                chroma.fft_size, chroma.hop_size
            )));
        }
        if !(chroma.min_freq > 0.0 && chroma.min_freq < chroma.max_freq) {
            return Err(AnalysisError::InvalidConfig(format!(
                "chroma frequency range {}..{} Hz is empty",
                chroma.min_freq, chroma.max_freq
            )));
        }
        if !(chroma.tuning_freq > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "tuning_freq must be positive, got {}",
                chroma.tuning_freq
            )));
        }

        let tempo = &self.tempo;
        if tempo.fft_size < 2 || tempo.hop_size == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "tempo frames need fft_size >= 2 and hop_size > 0, got {}/{}",
                tempo.fft_size, tempo.hop_size
            )));
        }
        if !(tempo.min_bpm > 0.0 && tempo.min_bpm < tempo.max_bpm) {
            return Err(AnalysisError::InvalidConfig(format!(
                "tempo range {}..{} BPM is empty",
                tempo.min_bpm, tempo.max_bpm
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_tempo_duration_secs, 2.0);
    }

    #[test]
    fn test_rejects_inverted_bpm_range() {
        let mut config = AnalysisConfig::default();
        config.tempo.min_bpm = 180.0;
        config.tempo.max_bpm = 90.0;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_hop() {
        let mut config = AnalysisConfig::default();
        config.chroma.hop_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_duration() {
        let mut config = AnalysisConfig::default();
        config.min_tempo_duration_secs = f64::NAN;
        assert!(config.validate().is_err());
    }
}
