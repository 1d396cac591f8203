//! Two-stage smoothing of raw cents deviations
//!
//! Raw per-frame cents values jitter: single-frame octave glitches from the
//! detector and transient noise show up as spikes. A short median window
//! absorbs isolated outliers, and an exponential moving average over the
//! median turns the remainder into a needle-friendly signal.
//!
//! Smoothing must never bridge silence: when a frame yields no pitch the
//! state is cleared, so the next vocal onset reads its own cents value
//! immediately instead of averaging against a stale pitch.

use std::collections::VecDeque;

use crate::config::SmoothingConfig;

/// Median + EMA smoother for cents deviations
///
/// # Example
/// ```
/// use intune_core::audio::smoothing::CentsSmoother;
/// use intune_core::config::SmoothingConfig;
///
/// let mut smoother = CentsSmoother::new(SmoothingConfig::default());
/// assert_eq!(smoother.push(12.0), 12.0); // first value passes through
/// ```
#[derive(Debug)]
pub struct CentsSmoother {
    /// Rolling window of recent raw cents values, oldest first
    window: VecDeque<f64>,
    /// Window capacity in frames
    capacity: usize,
    /// EMA smoothing factor
    alpha: f64,
    /// Current EMA value; `None` until the first value after a reset
    ema: Option<f64>,
    /// Scratch buffer reused by the median computation
    sorted: Vec<f64>,
}

impl CentsSmoother {
    /// Create a new smoother
    ///
    /// # Arguments
    /// * `config` - Window capacity and EMA factor (assumed validated)
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window),
            capacity: config.window.max(1),
            alpha: config.alpha,
            ema: None,
            sorted: Vec::with_capacity(config.window),
        }
    }

    /// Push a raw cents value and get the smoothed value back
    ///
    /// The value enters the rolling window (evicting the oldest entry once
    /// the window is full), the median of the window feeds the EMA, and the
    /// EMA is returned. The first value after construction or [`Self::reset`]
    /// initializes the EMA to the median directly, so there is no warm-up
    /// transient.
    pub fn push(&mut self, cents: f64) -> f64 {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(cents);

        let median = self.median();
        let ema = match self.ema {
            Some(prev) => self.alpha * median + (1.0 - self.alpha) * prev,
            None => median,
        };
        self.ema = Some(ema);
        ema
    }

    /// Clear all history
    ///
    /// Called by the tracker whenever a frame yields no pitch; stale history
    /// must not leak into the next vocal onset.
    pub fn reset(&mut self) {
        self.window.clear();
        self.ema = None;
    }

    /// Number of raw values currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the smoother holds no history
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Upper median of the current window contents
    fn median(&mut self) -> f64 {
        self.sorted.clear();
        self.sorted.extend(self.window.iter().copied());
        self.sorted
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.sorted[self.sorted.len() / 2]
    }
}
