//! Sampled audio and its pitch-class representation

use crate::error::AnalysisError;
use crate::pitch::PITCH_CLASSES;

/// Mono audio samples at a fixed sample rate
///
/// Immutable once constructed; analyzers only borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a waveform, rejecting a zero sample rate
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Samples normalized to -1.0..1.0
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`sample_count / sample_rate`)
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// One frame of pitch-class energy, index 0 = C
pub type ChromaFrame = [f32; PITCH_CLASSES];

/// Time-ordered sequence of chroma frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chromagram {
    frames: Vec<ChromaFrame>,
}

impl Chromagram {
    pub fn new(frames: Vec<ChromaFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[ChromaFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Element-wise sum of all frames (not an average)
    pub fn summed(&self) -> [f64; PITCH_CLASSES] {
        let mut total = [0.0f64; PITCH_CLASSES];
        for frame in &self.frames {
            for (acc, &v) in total.iter_mut().zip(frame.iter()) {
                *acc += v as f64;
            }
        }
        total
    }
}

impl From<Vec<ChromaFrame>> for Chromagram {
    fn from(frames: Vec<ChromaFrame>) -> Self {
        Self::new(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert_eq!(
            Waveform::new(vec![0.0; 10], 0),
            Err(AnalysisError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn test_duration() {
        let waveform = Waveform::new(vec![0.0; 22050], 44100).unwrap();
        assert!((waveform.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(waveform.len(), 22050);
    }

    #[test]
    fn test_chromagram_sums_frames() {
        let mut a = [0.0f32; 12];
        let mut b = [0.0f32; 12];
        a[0] = 1.0;
        b[0] = 2.0;
        b[7] = 0.5;

        let summed = Chromagram::new(vec![a, b]).summed();
        assert_eq!(summed[0], 3.0);
        assert_eq!(summed[7], 0.5);
        assert_eq!(summed.iter().sum::<f64>(), 3.5);
    }

    #[test]
    fn test_empty_chromagram_sums_to_zero() {
        assert_eq!(Chromagram::default().summed(), [0.0; 12]);
    }
}
