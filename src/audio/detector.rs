//! Time-domain pitch detection via normalized autocorrelation
//!
//! Estimates the fundamental period of one audio frame by scanning candidate
//! lags and scoring how well the frame matches itself shifted by each lag.
//! The score is difference-based (`1 - mean(|x[i] - x[i+lag]|)`) rather than
//! Pearson correlation: cheaper per lag and robust to amplitude drift within
//! the frame, which matters for a human voice.
//!
//! The scan accepts the first local score peak above the confidence
//! threshold. Larger lags at integer multiples of the true period also score
//! high, so stopping at the first strong peak rejects those harmonic false
//! locks in favor of the shortest periodic match.

use crate::config::DetectorConfig;

/// Root-mean-square amplitude of a frame
///
/// Returns 0.0 for an empty slice.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|&s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

/// A single-frame pitch estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Estimated fundamental frequency in Hz (always finite and positive)
    pub frequency_hz: f64,
    /// Autocorrelation score of the winning lag (threshold..=1.0)
    pub score: f32,
}

/// Autocorrelation pitch detector for fixed-length frames
///
/// Holds a pre-allocated score buffer so steady-state detection performs no
/// allocation. One detector serves one stream; it is cheap enough to run once
/// per display refresh on frames of a few thousand samples.
///
/// # Example
/// ```
/// use intune_core::audio::detector::PitchDetector;
/// use intune_core::audio::signal::SineGenerator;
/// use intune_core::config::DetectorConfig;
///
/// let mut detector = PitchDetector::new(48_000, 2048, DetectorConfig::default());
/// let mut frame = [0.0f32; 2048];
/// SineGenerator::new(440.0, 48_000).fill_buffer(&mut frame);
///
/// let estimate = detector.detect(&frame).expect("sine should be detected");
/// assert!((estimate.frequency_hz - 440.0).abs() < 2.0);
/// ```
#[derive(Debug)]
pub struct PitchDetector {
    /// Sample rate in Hz
    sample_rate: u32,
    /// Expected frame length in samples
    frame_len: usize,
    /// Tuning parameters
    config: DetectorConfig,
    /// Score per candidate lag, indexed by lag (0..=frame_len/2).
    /// Entries below `min_lag` are never written.
    scores: Vec<f32>,
}

impl PitchDetector {
    /// Create a new detector
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of incoming frames in Hz
    /// * `frame_len` - Exact length of every frame passed to [`Self::detect`]
    /// * `config` - Detection thresholds
    ///
    /// # Panics
    /// Panics if `sample_rate` is zero, `frame_len < 32`, or `min_lag` does
    /// not leave room for the half-frame lag scan. Construct from a validated
    /// [`TrackerConfig`](crate::config::TrackerConfig) to get a `Result`
    /// instead.
    pub fn new(sample_rate: u32, frame_len: usize, config: DetectorConfig) -> Self {
        assert!(sample_rate > 0, "Sample rate must be non-zero");
        assert!(frame_len >= 32, "Frame length must be at least 32 samples");
        assert!(
            config.min_lag >= 1 && config.min_lag < frame_len / 2,
            "Minimum lag must be in 1..frame_len/2"
        );

        Self {
            sample_rate,
            frame_len,
            config,
            scores: vec![0.0; frame_len / 2 + 1],
        }
    }

    /// Get the configured sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the expected frame length
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Lowest frequency the lag scan can resolve, in Hz
    pub fn min_frequency(&self) -> f64 {
        self.sample_rate as f64 / (self.frame_len / 2) as f64
    }

    /// Highest frequency the lag scan can resolve, in Hz
    pub fn max_frequency(&self) -> f64 {
        self.sample_rate as f64 / self.config.min_lag as f64
    }

    /// Detect the fundamental frequency of one frame
    ///
    /// Returns `None` for silence (RMS below the gate) and for frames with no
    /// confident periodic match. Neither is an error; both are normal states
    /// for unvoiced or noisy input.
    ///
    /// # Panics
    /// Panics if `frame.len()` differs from the length the detector was
    /// constructed with.
    pub fn detect(&mut self, frame: &[f32]) -> Option<PitchEstimate> {
        assert_eq!(
            frame.len(),
            self.frame_len,
            "Frame length does not match detector configuration"
        );

        let level = rms(frame);
        if level < self.config.silence_threshold {
            tracing::trace!(rms = level, "frame below silence gate");
            return None;
        }

        let max_lag = self.frame_len / 2;
        let threshold = self.config.score_threshold;

        let mut best_lag = 0usize;
        let mut best_score = 0.0f32;
        // Seeded above any reachable score so lag `min_lag` itself cannot
        // count as "rising"; matches treating the lag-0 score as perfect.
        let mut last_score = 1.0f32;

        for lag in self.config.min_lag..=max_lag {
            let score = self.correlation_score(frame, lag);
            self.scores[lag] = score;

            if score > threshold && score > last_score {
                best_score = score;
                best_lag = lag;
            } else if best_score > threshold && score < last_score {
                // First falling transition after a confident rise: accept the
                // remembered peak rather than scanning on to harmonic lags.
                return self.accept(best_lag, best_score, lag);
            }
            last_score = score;
        }

        if best_score > threshold {
            // Scan ended while still rising; the best lag seen stands.
            return self.accept(best_lag, best_score, max_lag);
        }

        tracing::trace!(rms = level, best_score, "no confident period");
        None
    }

    /// Turn an accepted integer lag into a refined frequency estimate
    ///
    /// `scanned_up_to` is the highest lag whose score has been written this
    /// frame; interpolation only reads neighbors inside that range.
    fn accept(&self, best_lag: usize, best_score: f32, scanned_up_to: usize) -> Option<PitchEstimate> {
        let correction = self.parabolic_correction(best_lag, scanned_up_to);
        let period = best_lag as f64 + correction;
        if period <= 0.0 {
            return None;
        }

        let frequency_hz = self.sample_rate as f64 / period;
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return None;
        }

        tracing::trace!(lag = best_lag, correction, frequency_hz, "period accepted");
        Some(PitchEstimate {
            frequency_hz,
            score: best_score,
        })
    }

    /// Similarity between the frame and itself shifted by `lag`
    ///
    /// 1.0 means a perfect periodic match; the mean absolute difference over
    /// the first half of the frame is subtracted from one.
    fn correlation_score(&self, frame: &[f32], lag: usize) -> f32 {
        let half = self.frame_len / 2;
        let mut diff = 0.0f32;
        for i in 0..half {
            diff += (frame[i] - frame[i + lag]).abs();
        }
        1.0 - diff / half as f32
    }

    /// Fractional lag correction from a parabola fit through the scores at
    /// `lag - 1`, `lag`, `lag + 1`
    ///
    /// Falls back to zero when a neighbor lies outside the scanned range or
    /// the parabola is degenerate (zero denominator).
    fn parabolic_correction(&self, lag: usize, scanned_up_to: usize) -> f64 {
        if lag <= self.config.min_lag || lag + 1 > scanned_up_to {
            return 0.0;
        }

        let y1 = self.scores[lag - 1] as f64;
        let y2 = self.scores[lag] as f64;
        let y3 = self.scores[lag + 1] as f64;

        let denom = y1 - 2.0 * y2 + y3;
        if denom == 0.0 {
            tracing::trace!(lag, "degenerate parabola, using integer lag");
            return 0.0;
        }
        (y1 - y3) / (2.0 * denom)
    }
}
