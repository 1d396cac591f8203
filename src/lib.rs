//! Intune Core - Real-time vocal pitch tracking
//!
//! This library provides the numeric core of a vocal intonation trainer:
//! it consumes fixed-length frames of time-domain audio, estimates the
//! fundamental frequency of the dominant periodic component once per frame,
//! converts that frequency into a signed cents deviation from a target pitch
//! (folded into the nearest octave), and smooths the result into a stable
//! per-frame signal suitable for driving a tuner needle.
//!
//! Audio capture, playback, rendering, and settings persistence are external
//! collaborators. The host drives [`IntonationTracker::tick`] at its own
//! cadence (typically once per display refresh) and consumes one
//! [`TrackerUpdate`] per tick.

pub mod audio;
pub mod config;
pub mod music;

pub use audio::detector::{PitchDetector, PitchEstimate};
pub use audio::smoothing::CentsSmoother;
pub use audio::source::FrameSource;
pub use audio::tracker::{
    IntonationTracker, TargetCell, TrackerError, TrackerState, TrackerUpdate,
};
pub use config::{ConfigError, DetectorConfig, SmoothingConfig, TrackerConfig};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default sample rate for audio processing (48kHz, the common capture rate)
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default analysis frame length in samples (~43ms at 48kHz)
pub const DEFAULT_FRAME_LEN: usize = 2048;

/// Reference frequency of A4 in equal temperament
pub const A4_HZ: f64 = 440.0;

/// MIDI note number of A4
pub const A4_MIDI: f64 = 69.0;
