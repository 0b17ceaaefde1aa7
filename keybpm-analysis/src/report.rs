//! Analysis result record

use crate::pitch::Key;
use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder rendered for undetermined values
pub const NOT_AVAILABLE: &str = "N/A";

/// A value that may be undetermined
///
/// Serializes as the inner value, or the string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate<T> {
    Known(T),
    NotAvailable,
}

impl<T> Estimate<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Estimate::Known(value) => Some(value),
            Estimate::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Estimate::Known(_))
    }
}

impl<T> From<Option<T>> for Estimate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Estimate::NotAvailable, Estimate::Known)
    }
}

impl<T: Serialize> Serialize for Estimate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Estimate::Known(value) => value.serialize(serializer),
            Estimate::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Estimate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Known(value) => fmt::Display::fmt(value, f),
            Estimate::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Tempo and key of one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackReport {
    /// Rounded tempo, always positive when known
    pub bpm: Estimate<u32>,
    pub key: Estimate<Key>,
}

impl TrackReport {
    pub fn new(bpm: Estimate<u32>, key: Estimate<Key>) -> Self {
        Self { bpm, key }
    }
}

/// Round a raw tempo to a positive whole BPM
///
/// Halves go to the even neighbour, so 112.5 reports as 112.
pub fn round_bpm(raw: f32) -> Estimate<u32> {
    if !raw.is_finite() {
        return Estimate::NotAvailable;
    }
    let rounded = round_half_even(raw);
    if rounded >= 1.0 && rounded <= u32::MAX as f32 {
        Estimate::Known(rounded as u32)
    } else {
        Estimate::NotAvailable
    }
}

fn round_half_even(value: f32) -> f32 {
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        value.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{Mode, PitchClass};

    #[test]
    fn test_serialize_known() {
        let report = TrackReport::new(
            Estimate::Known(120),
            Estimate::Known(Key::new(PitchClass::A, Mode::Minor)),
        );
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"bpm":120,"key":"A minor"}"#
        );
    }

    #[test]
    fn test_serialize_not_available() {
        let report = TrackReport::new(Estimate::NotAvailable, Estimate::NotAvailable);
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"bpm":"N/A","key":"N/A"}"#
        );
    }

    #[test]
    fn test_round_bpm() {
        assert_eq!(round_bpm(119.6), Estimate::Known(120));
        assert_eq!(round_bpm(127.4), Estimate::Known(127));
        assert_eq!(round_bpm(0.2), Estimate::NotAvailable);
        assert_eq!(round_bpm(-90.0), Estimate::NotAvailable);
        assert_eq!(round_bpm(f32::NAN), Estimate::NotAvailable);
        assert_eq!(round_bpm(f32::INFINITY), Estimate::NotAvailable);
    }

    #[test]
    fn test_round_bpm_halves_to_even() {
        // 48 kHz, hop 512, lag 50 frames
        let raw = 48_000.0 / 512.0 * 60.0 / 50.0;
        assert_eq!(raw, 112.5);
        assert_eq!(round_bpm(raw), Estimate::Known(112));
        assert_eq!(round_bpm(113.5), Estimate::Known(114));
        assert_eq!(round_bpm(120.5), Estimate::Known(120));
        assert_eq!(round_bpm(0.5), Estimate::NotAvailable);
        assert_eq!(round_bpm(1.5), Estimate::Known(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Estimate::Known(98).to_string(), "98");
        assert_eq!(Estimate::<u32>::NotAvailable.to_string(), "N/A");
        assert_eq!(Estimate::from(None::<u32>), Estimate::NotAvailable);
    }
}
