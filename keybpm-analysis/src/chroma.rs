//! Chromagram extraction via STFT
//!
//! Each Hann-windowed frame is transformed with an FFT and every bin in the
//! musical range is folded onto its nearest pitch class.

use crate::config::ChromaConfig;
use crate::error::AnalysisError;
use crate::pitch::PITCH_CLASSES;
use crate::waveform::{ChromaFrame, Chromagram, Waveform};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// Turns a waveform into a time-indexed 12-bin pitch-class energy sequence
pub trait ChromaExtractor {
    fn extract(&self, waveform: &Waveform) -> Result<Chromagram, AnalysisError>;
}

/// STFT chromagram with harmonic weighting and octave decay
pub struct StftChroma {
    config: ChromaConfig,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
}

impl StftChroma {
    pub fn new(config: ChromaConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);

        // Pre-compute Hann window
        let fft_size = config.fft_size;
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            config,
            fft,
            window,
        }
    }

    /// Map each FFT bin below Nyquist to a pitch class and a weight
    ///
    /// Weights combine closeness to an exact pitch (1.0 on pitch, 0.0 half a
    /// semitone away) with ~6dB/octave decay above 500Hz.
    fn pitch_class_mapping(&self, sample_rate: u32) -> Vec<Option<(usize, f32)>> {
        let fft_size = self.config.fft_size;
        let nyquist = sample_rate as f32 / 2.0;
        let bin_freq = |bin: usize| -> f32 { bin as f32 * sample_rate as f32 / fft_size as f32 };

        (0..fft_size / 2)
            .map(|bin| {
                let freq = bin_freq(bin);
                if freq < self.config.min_freq || freq > self.config.max_freq || freq >= nyquist {
                    return None;
                }

                // MIDI note number relative to the tuning reference (A4 = 69)
                let midi_note = 12.0 * (freq / self.config.tuning_freq).log2() + 69.0;
                let exact_note = midi_note.round();
                let pitch_class = (exact_note as i32).rem_euclid(PITCH_CLASSES as i32) as usize;

                let detune = (midi_note - exact_note).abs();
                let harmonic_weight = (1.0 - detune.min(0.5) * 2.0).max(0.0);
                let octave_decay = (500.0 / freq.max(500.0)).sqrt();

                Some((pitch_class, harmonic_weight * octave_decay))
            })
            .collect()
    }

    /// Chroma of one frame; `buffer` is reused across frames
    fn analyze_frame(
        &self,
        frame: &[f32],
        mapping: &[Option<(usize, f32)>],
        buffer: &mut [Complex<f32>],
    ) -> ChromaFrame {
        // Zero-padded when the frame is shorter than the FFT
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = frame.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(buffer);

        let mut chroma = [0.0f32; PITCH_CLASSES];
        for (complex, entry) in buffer.iter().zip(mapping) {
            if let Some((pitch_class, weight)) = *entry {
                chroma[pitch_class] += complex.norm_sqr() * weight;
            }
        }

        if self.config.normalize_frames {
            let max = chroma.iter().cloned().fold(0.0f32, f32::max);
            if max > 0.0 {
                for v in &mut chroma {
                    *v /= max;
                }
            }
        }

        chroma
    }
}

impl Default for StftChroma {
    fn default() -> Self {
        Self::new(ChromaConfig::default())
    }
}

impl ChromaExtractor for StftChroma {
    fn extract(&self, waveform: &Waveform) -> Result<Chromagram, AnalysisError> {
        let samples = waveform.samples();
        if samples.is_empty() {
            return Ok(Chromagram::default());
        }

        let fft_size = self.config.fft_size;
        let hop_size = self.config.hop_size;
        if fft_size < 2 || hop_size == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "chroma frames need fft_size >= 2 and hop_size > 0, got {}/{}",
                fft_size, hop_size
            )));
        }

        let mapping = self.pitch_class_mapping(waveform.sample_rate());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_size];
        let mut frames = Vec::new();

        let mut pos = 0;
        loop {
            let end = (pos + fft_size).min(samples.len());
            frames.push(self.analyze_frame(&samples[pos..end], &mapping, &mut buffer));
            if pos + fft_size >= samples.len() {
                break;
            }
            pos += hop_size;
        }

        debug!(
            frames = frames.len(),
            sample_rate = waveform.sample_rate(),
            "chromagram extracted"
        );

        Ok(Chromagram::new(frames))
    }
}
