//! Audio file decoding for keybpm

mod loader;

pub use loader::{LoadError, TrackLoader};
