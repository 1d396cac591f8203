//! Tracker and detector configuration
//!
//! All types are serde-derived so hosts can persist them alongside their own
//! settings; this crate itself performs no file I/O. Every field has a
//! default, so partial JSON deserializes cleanly, and [`TrackerConfig::validate`]
//! rejects values the pipeline cannot run with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_sample_rate() -> u32 {
    crate::DEFAULT_SAMPLE_RATE
}

fn default_frame_len() -> usize {
    crate::DEFAULT_FRAME_LEN
}

fn default_silence_threshold() -> f32 {
    0.003
}

fn default_score_threshold() -> f32 {
    0.85
}

fn default_min_lag() -> usize {
    8
}

fn default_window() -> usize {
    7
}

fn default_alpha() -> f64 {
    0.25
}

/// Errors raised by configuration validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate {0} Hz outside supported range 8000-384000")]
    SampleRateOutOfRange(u32),

    #[error("frame length {0} too small (minimum 32 samples)")]
    FrameLenTooSmall(usize),

    #[error("frame length {0} must be even")]
    FrameLenOdd(usize),

    #[error("{name} threshold {value} outside (0, 1)")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("minimum lag {min_lag} must be in 1..{max} (half the frame length)")]
    MinLagOutOfRange { min_lag: usize, max: usize },

    #[error("smoothing window must hold at least one entry")]
    WindowEmpty,

    #[error("smoothing alpha {0} outside (0, 1]")]
    AlphaOutOfRange(f64),
}

/// Pitch detector tuning parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// RMS amplitude below which a frame is treated as silence.
    /// 0.003 of full scale accepts normal singing levels while rejecting
    /// the noise floor of typical microphones.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,
    /// Normalized autocorrelation score a lag must exceed to count as a
    /// periodic match (1.0 = perfect periodicity)
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
    /// Smallest candidate lag in samples; bounds the highest detectable
    /// frequency (sample_rate / min_lag)
    #[serde(default = "default_min_lag")]
    pub min_lag: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            silence_threshold: default_silence_threshold(),
            score_threshold: default_score_threshold(),
            min_lag: default_min_lag(),
        }
    }
}

/// Cents smoothing parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Median window capacity in frames (FIFO eviction)
    #[serde(default = "default_window")]
    pub window: usize,
    /// EMA smoothing factor; higher tracks faster, lower is steadier
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            alpha: default_alpha(),
        }
    }
}

/// Full tracker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Sample rate of incoming frames in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Analysis frame length in samples
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frame_len: default_frame_len(),
            detector: DetectorConfig::default(),
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Check that every field is inside the range the pipeline supports
    ///
    /// # Returns
    /// The first violation found, or `Ok(())`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8_000..=384_000).contains(&self.sample_rate) {
            return Err(ConfigError::SampleRateOutOfRange(self.sample_rate));
        }
        if self.frame_len < 32 {
            return Err(ConfigError::FrameLenTooSmall(self.frame_len));
        }
        if self.frame_len % 2 != 0 {
            return Err(ConfigError::FrameLenOdd(self.frame_len));
        }
        for (name, value) in [
            ("silence", self.detector.silence_threshold),
            ("score", self.detector.score_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        let max_lag = self.frame_len / 2;
        if self.detector.min_lag == 0 || self.detector.min_lag >= max_lag {
            return Err(ConfigError::MinLagOutOfRange {
                min_lag: self.detector.min_lag,
                max: max_lag,
            });
        }
        if self.smoothing.window == 0 {
            return Err(ConfigError::WindowEmpty);
        }
        if !self.smoothing.alpha.is_finite()
            || self.smoothing.alpha <= 0.0
            || self.smoothing.alpha > 1.0
        {
            return Err(ConfigError::AlphaOutOfRange(self.smoothing.alpha));
        }
        Ok(())
    }
}
