//! Key detection using Krumhansl-Schmuckler template correlation
//!
//! 1. Sum the chromagram over time and L1-normalize it
//! 2. Rotate each key profile to all 12 roots and L1-normalize it
//! 3. Pearson-correlate the chroma vector with all 24 rotated profiles
//! 4. Return the best scoring key (first seen wins ties)

use crate::pitch::{Key, Mode, PitchClass, PITCH_CLASSES};
use crate::waveform::Chromagram;
use tracing::debug;

/// Krumhansl-Schmuckler major key profile
///
/// Index 0 = tonic. Not normalized.
const MAJOR_PROFILE: [f64; PITCH_CLASSES] = [
    6.35, // Tonic (I)
    2.23, // Minor 2nd
    3.48, // Major 2nd
    2.33, // Minor 3rd
    4.38, // Major 3rd
    4.09, // Perfect 4th
    2.52, // Tritone
    5.19, // Perfect 5th
    2.39, // Minor 6th
    3.66, // Major 6th
    2.29, // Minor 7th
    2.88, // Major 7th
];

/// Krumhansl-Schmuckler minor key profile
///
/// Index 0 = tonic. Not normalized.
const MINOR_PROFILE: [f64; PITCH_CLASSES] = [
    6.33, // Tonic (i)
    2.68, // Minor 2nd
    3.52, // Major 2nd
    5.38, // Minor 3rd
    2.60, // Major 3rd
    3.53, // Perfect 4th
    2.54, // Tritone
    4.75, // Perfect 5th
    3.98, // Minor 6th
    2.69, // Major 6th
    3.34, // Minor 7th
    3.17, // Major 7th
];

/// Reference profile for a mode, tonic at index 0
pub fn key_profile(mode: Mode) -> &'static [f64; PITCH_CLASSES] {
    match mode {
        Mode::Major => &MAJOR_PROFILE,
        Mode::Minor => &MINOR_PROFILE,
    }
}

/// A (root, mode) hypothesis with its correlation score
///
/// The score is a Pearson coefficient in [-1, 1], or NaN when the
/// correlation is undefined (zero-variance input).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCandidate {
    pub key: Key,
    pub score: f64,
}

/// Key estimator over a chromagram
///
/// Stateless: every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyEstimator;

impl KeyEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the key of a chromagram
    ///
    /// Returns None for silence (zero summed energy) or when no candidate
    /// has a defined correlation.
    pub fn estimate(&self, chromagram: &Chromagram) -> Option<Key> {
        let best = best_candidate(self.candidates(chromagram)?)?;
        debug!(key = %best.key, correlation = best.score, "key estimated");
        Some(best.key)
    }

    /// Score all 24 candidates in iteration order (major roots 0..12, then minor)
    ///
    /// Returns None when the chromagram carries no energy.
    pub fn candidates(&self, chromagram: &Chromagram) -> Option<Vec<KeyCandidate>> {
        let chroma = l1_normalize(&chromagram.summed())?;

        let candidates = Mode::ALL
            .into_iter()
            .flat_map(|mode| PitchClass::ALL.into_iter().map(move |root| Key::new(root, mode)))
            .map(|key| {
                let rotated = rotate_profile(key_profile(key.mode), key.root.index());
                let score = match l1_normalize(&rotated) {
                    Some(profile) => pearson(&chroma, &profile),
                    None => f64::NAN,
                };
                KeyCandidate { key, score }
            })
            .collect();

        Some(candidates)
    }
}

/// Pick the highest scoring candidate
///
/// A candidate replaces the current best only when strictly greater, so the
/// earliest of equal scores wins. NaN scores never win.
pub fn best_candidate<I>(candidates: I) -> Option<KeyCandidate>
where
    I: IntoIterator<Item = KeyCandidate>,
{
    candidates
        .into_iter()
        .filter(|c| !c.score.is_nan())
        .fold(None, |best: Option<KeyCandidate>, candidate| match best {
            Some(current) if candidate.score <= current.score => Some(current),
            _ => Some(candidate),
        })
}

/// Shift a profile so its tonic (index 0) lands on `root`
///
/// Circular: `rotated[j] = profile[(j - root) mod 12]`.
pub fn rotate_profile(profile: &[f64; PITCH_CLASSES], root: usize) -> [f64; PITCH_CLASSES] {
    let mut rotated = [0.0f64; PITCH_CLASSES];
    for (j, slot) in rotated.iter_mut().enumerate() {
        *slot = profile[(j + PITCH_CLASSES - root % PITCH_CLASSES) % PITCH_CLASSES];
    }
    rotated
}

/// Divide by the sum so the values add up to 1; None if the sum is zero
fn l1_normalize(values: &[f64; PITCH_CLASSES]) -> Option<[f64; PITCH_CLASSES]> {
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return None;
    }
    let mut normalized = *values;
    for v in &mut normalized {
        *v /= sum;
    }
    Some(normalized)
}

/// Pearson correlation coefficient between two 12-element vectors
///
/// NaN when either vector has zero variance.
pub fn pearson(a: &[f64; PITCH_CLASSES], b: &[f64; PITCH_CLASSES]) -> f64 {
    // Rounding in the mean would otherwise leave a tiny nonzero spread
    if is_constant(a) || is_constant(b) {
        return f64::NAN;
    }

    let n = PITCH_CLASSES as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut numerator = 0.0f64;
    let mut denom_a = 0.0f64;
    let mut denom_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        numerator += da * db;
        denom_a += da * da;
        denom_b += db * db;
    }

    let denom = (denom_a * denom_b).sqrt();
    if denom > 0.0 {
        numerator / denom
    } else {
        f64::NAN
    }
}

fn is_constant(values: &[f64; PITCH_CLASSES]) -> bool {
    values.iter().all(|&v| v == values[0])
}
