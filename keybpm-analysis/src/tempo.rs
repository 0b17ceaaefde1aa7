//! Tempo estimation using spectral flux and autocorrelation
//!
//! Builds a spectral flux onset envelope, finds the strongest periodicity in
//! the configured BPM range, then resolves octave errors (half/double tempo).

use crate::config::TempoConfig;
use crate::waveform::Waveform;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// Estimates a single tempo (BPM) for a waveform
///
/// Returns None when no periodicity can be determined.
pub trait TempoEstimator {
    fn estimate_tempo(&self, waveform: &Waveform) -> Option<f32>;
}

/// Spectral flux onset envelope + autocorrelation tempo estimator
pub struct SpectralFluxTempo {
    config: TempoConfig,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
}

impl Default for SpectralFluxTempo {
    fn default() -> Self {
        Self::new(TempoConfig::default())
    }
}

impl TempoEstimator for SpectralFluxTempo {
    fn estimate_tempo(&self, waveform: &Waveform) -> Option<f32> {
        let onset_fn = self.compute_onset_function(waveform.samples());
        let frames_per_second = waveform.sample_rate() as f32 / self.config.hop_size as f32;

        let (bpm, confidence) = self.estimate_bpm_autocorrelation(&onset_fn, frames_per_second)?;
        debug!(bpm, confidence, frames = onset_fn.len(), "tempo estimated");
        Some(bpm)
    }
}

impl SpectralFluxTempo {
    pub fn new(config: TempoConfig) -> Self {
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Pre-compute Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            config,
            fft,
            window,
        }
    }

    /// Spectral flux onset envelope, one value per hop after the first frame
    ///
    /// Transients (kicks, snares) show up as bursts of newly added energy.
    /// The envelope is scaled so its peak is 1.
    fn compute_onset_function(&self, samples: &[f32]) -> Vec<f32> {
        let fft_size = self.config.fft_size;
        let hop_size = self.config.hop_size;
        if hop_size == 0 || fft_size < 2 || samples.len() < fft_size {
            return Vec::new();
        }

        let bins = fft_size / 2;
        let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_size];
        let mut previous = vec![0.0f32; bins];
        let mut current = vec![0.0f32; bins];
        let mut envelope = Vec::with_capacity((samples.len() - fft_size) / hop_size);

        for (index, frame) in samples.windows(fft_size).step_by(hop_size).enumerate() {
            for (slot, (s, w)) in buffer.iter_mut().zip(frame.iter().zip(&self.window)) {
                *slot = Complex::new(s * w, 0.0);
            }
            self.fft.process(&mut buffer);

            for (magnitude, bin) in current.iter_mut().zip(&buffer[..bins]) {
                *magnitude = bin.norm();
            }
            if index > 0 {
                envelope.push(rising_energy(&previous, &current));
            }
            std::mem::swap(&mut previous, &mut current);
        }

        let peak = envelope.iter().copied().fold(0.0f32, f32::max);
        if peak > 0.0 {
            envelope.iter_mut().for_each(|v| *v /= peak);
        }
        envelope
    }

    /// Estimate BPM using autocorrelation of the onset function
    ///
    /// The lag with highest correlation corresponds to the beat period.
    /// Returns the BPM and the winning correlation as a confidence.
    fn estimate_bpm_autocorrelation(
        &self,
        onset_fn: &[f32],
        frames_per_second: f32,
    ) -> Option<(f32, f32)> {
        let min_lag = ((frames_per_second * 60.0 / self.config.max_bpm) as usize).max(1);
        let max_lag = (frames_per_second * 60.0 / self.config.min_bpm) as usize;

        // Analyze at most ~8 periods of the slowest tempo
        let analysis_len = onset_fn.len().min(max_lag.saturating_mul(8));
        let analysis = &onset_fn[..analysis_len];

        let upper = max_lag.min(analysis_len / 2);
        if min_lag >= upper {
            debug!(frames = onset_fn.len(), "onset envelope too short for tempo");
            return None;
        }

        let mut best_lag = min_lag;
        let mut best_correlation = 0.0f32;

        for lag in min_lag..upper {
            let correlation = lag_correlation(analysis, lag);
            if correlation > best_correlation {
                best_correlation = correlation;
                best_lag = lag;
            }
        }

        // Silent or featureless envelope
        if best_correlation <= 0.0 {
            return None;
        }

        let seconds_per_beat = best_lag as f32 / frames_per_second;
        let raw_bpm = 60.0 / seconds_per_beat;
        let final_bpm = self.disambiguate_octave(analysis, raw_bpm, frames_per_second);

        Some((final_bpm, best_correlation.clamp(0.0, 1.0)))
    }

    /// Disambiguate between octave-related BPM values (e.g., 77 vs 154)
    ///
    /// In the ambiguous 65-95 range the doubled tempo wins when it lands in
    /// 120-180 and correlates at least 70% as strongly.
    fn disambiguate_octave(&self, onset_fn: &[f32], raw_bpm: f32, frames_per_second: f32) -> f32 {
        if raw_bpm < 65.0 {
            return raw_bpm * 2.0;
        }

        if raw_bpm > 185.0 {
            return raw_bpm / 2.0;
        }

        if (65.0..=95.0).contains(&raw_bpm) {
            let doubled_bpm = raw_bpm * 2.0;

            let original_lag = (frames_per_second * 60.0 / raw_bpm) as usize;
            let doubled_lag = (frames_per_second * 60.0 / doubled_bpm) as usize;

            let original_corr = lag_correlation(onset_fn, original_lag);
            let doubled_corr = lag_correlation(onset_fn, doubled_lag);

            let doubled_is_reasonable = (120.0..=180.0).contains(&doubled_bpm);
            let correlation_ratio = doubled_corr / original_corr.max(0.001);

            if doubled_is_reasonable && correlation_ratio > 0.7 {
                return doubled_bpm;
            }
        }

        // Only halve 170-185 when the halved period is clearly stronger
        if (170.0..=185.0).contains(&raw_bpm) {
            let halved_bpm = raw_bpm / 2.0;

            let original_lag = (frames_per_second * 60.0 / raw_bpm) as usize;
            let halved_lag = (frames_per_second * 60.0 / halved_bpm) as usize;

            let original_corr = lag_correlation(onset_fn, original_lag);
            let halved_corr = lag_correlation(onset_fn, halved_lag);

            if halved_corr > original_corr * 1.2 {
                return halved_bpm;
            }
        }

        raw_bpm
    }
}

/// Energy gained from `previous` to `current`; losses count as zero
fn rising_energy(previous: &[f32], current: &[f32]) -> f32 {
    current
        .iter()
        .zip(previous)
        .map(|(now, before)| (now - before).max(0.0))
        .sum()
}

/// Cosine similarity between the envelope and itself shifted by `lag`
///
/// Lags of zero or at least half the envelope score 0.
fn lag_correlation(envelope: &[f32], lag: usize) -> f32 {
    if lag == 0 || lag >= envelope.len() / 2 {
        return 0.0;
    }

    let (cross, head, tail) = envelope
        .iter()
        .zip(&envelope[lag..])
        .fold((0.0f32, 0.0f32, 0.0f32), |(cross, head, tail), (&a, &b)| {
            (cross + a * b, head + a * a, tail + b * b)
        });

    let norm = (head * tail).sqrt();
    if norm > 0.0 {
        cross / norm
    } else {
        0.0
    }
}
