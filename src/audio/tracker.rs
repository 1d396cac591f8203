//! Intonation tracking: frame loop, target management, and lifecycle
//!
//! The tracker owns the detector and the smoother, holds the active target
//! pitch, and turns one audio frame per tick into one [`TrackerUpdate`]. The
//! driving clock is external: hosts call [`IntonationTracker::tick`] (or
//! [`IntonationTracker::tick_frame`]) at whatever cadence they have,
//! typically once per display refresh.
//!
//! Each tick is synchronous, bounded-time, and allocation-free in steady
//! state. Updates are returned directly and fanned out to subscribers over
//! bounded channels with `try_send`, so a stalled consumer can never block
//! the frame loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::audio::detector::{rms, PitchDetector};
use crate::audio::smoothing::CentsSmoother;
use crate::audio::source::FrameSource;
use crate::config::{ConfigError, TrackerConfig};
use crate::music::cents_diff;

/// Capacity of each subscriber channel; ticks drop updates for subscribers
/// that fall further behind than this
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Errors raised by tracker operations
///
/// Per-frame detection "failures" (silence, no confident period) are not
/// errors; they appear as the `None` fields of [`TrackerUpdate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("tracker is not started; call start() before ticking")]
    NotTracking,

    #[error("frame length mismatch: expected {expected}, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("invalid target frequency {0} Hz (must be finite and positive)")]
    InvalidTarget(f64),
}

/// Tracker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not started; ticks are rejected
    Idle,
    /// Started; ticks drive frames through the pipeline
    Tracking,
}

/// Per-frame tracking result
///
/// Exactly one is produced per tick: returned to the caller and sent to every
/// subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    /// Smoothed cents deviation from the target, in `[-600, 600)`.
    /// `None` when no pitch was detected or no target is set.
    pub cents: Option<f64>,
    /// Raw detected frequency in Hz; `None` when no pitch was detected
    pub frequency_hz: Option<f64>,
    /// RMS level of the frame, for UI level meters
    pub level: f32,
}

impl TrackerUpdate {
    fn silent(level: f32) -> Self {
        Self {
            cents: None,
            frequency_hz: None,
            level,
        }
    }
}

/// Cloneable handle for setting the target pitch from another thread
///
/// Wraps a single atomic cell holding the target's `f64` bits (zero bits mean
/// "no target"), so a game-logic thread can repoint the tracker while an
/// audio-side thread ticks it. One atomic write per set/clear, one atomic
/// read per tick.
#[derive(Debug, Clone, Default)]
pub struct TargetCell {
    bits: Arc<AtomicU64>,
}

impl TargetCell {
    /// Create an empty cell (no target)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target frequency
    ///
    /// # Arguments
    /// * `hz` - Target frequency in Hz
    ///
    /// # Returns
    /// `Err(TrackerError::InvalidTarget)` for non-finite or non-positive
    /// frequencies; the previous target is kept in that case.
    pub fn set(&self, hz: f64) -> Result<(), TrackerError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(TrackerError::InvalidTarget(hz));
        }
        self.bits.store(hz.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Clear the target; deviation becomes uncomputable until the next set
    pub fn clear(&self) {
        self.bits.store(0, Ordering::Relaxed);
    }

    /// Read the current target, if any
    pub fn get(&self) -> Option<f64> {
        match self.bits.load(Ordering::Relaxed) {
            0 => None,
            bits => Some(f64::from_bits(bits)),
        }
    }
}

/// Real-time vocal pitch tracker
///
/// # Example
/// ```
/// use intune_core::audio::signal::SineGenerator;
/// use intune_core::audio::tracker::IntonationTracker;
/// use intune_core::config::TrackerConfig;
///
/// let mut tracker = IntonationTracker::new(TrackerConfig::default()).unwrap();
/// tracker.start();
/// tracker.set_target_hz(440.0).unwrap();
///
/// let mut source = SineGenerator::new(440.0, 48_000);
/// let update = tracker.tick(&mut source).unwrap();
/// assert!(update.cents.unwrap().abs() < 10.0);
/// ```
pub struct IntonationTracker {
    state: TrackerState,
    detector: PitchDetector,
    smoother: CentsSmoother,
    target: TargetCell,
    /// Pre-allocated buffer for frames pulled from a source
    frame: Vec<f32>,
    /// Subscriber channels; disconnected receivers are pruned on send
    subscribers: Vec<Sender<TrackerUpdate>>,
}

impl IntonationTracker {
    /// Create a new tracker from a validated configuration
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: TrackerState::Idle,
            detector: PitchDetector::new(config.sample_rate, config.frame_len, config.detector),
            smoother: CentsSmoother::new(config.smoothing),
            target: TargetCell::new(),
            frame: vec![0.0; config.frame_len],
            subscribers: Vec::new(),
        })
    }

    /// Get current lifecycle state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Get the configured sample rate
    pub fn sample_rate(&self) -> u32 {
        self.detector.sample_rate()
    }

    /// Get the configured frame length
    pub fn frame_len(&self) -> usize {
        self.detector.frame_len()
    }

    /// Begin tracking; idempotent
    pub fn start(&mut self) {
        if self.state == TrackerState::Tracking {
            return;
        }
        self.smoother.reset();
        self.state = TrackerState::Tracking;
        tracing::info!(
            sample_rate = self.detector.sample_rate(),
            frame_len = self.detector.frame_len(),
            "tracker started"
        );
    }

    /// Stop tracking; idempotent and immediate
    ///
    /// Each tick is bounded and self-contained, so there is nothing in flight
    /// to interrupt. Smoothing history is dropped so a later restart begins
    /// fresh.
    pub fn stop(&mut self) {
        if self.state == TrackerState::Idle {
            return;
        }
        self.smoother.reset();
        self.state = TrackerState::Idle;
        tracing::info!("tracker stopped");
    }

    /// Set the target pitch
    ///
    /// Legal in any state; takes effect on the next tick while tracking.
    pub fn set_target_hz(&mut self, hz: f64) -> Result<(), TrackerError> {
        self.target.set(hz)?;
        tracing::debug!(target_hz = hz, "target set");
        Ok(())
    }

    /// Clear the target pitch
    pub fn clear_target(&mut self) {
        self.target.clear();
        tracing::debug!("target cleared");
    }

    /// Current target pitch, if any
    pub fn target_hz(&self) -> Option<f64> {
        self.target.get()
    }

    /// Get a cloneable handle for setting the target from another thread
    pub fn target_cell(&self) -> TargetCell {
        self.target.clone()
    }

    /// Subscribe to per-frame updates
    ///
    /// Every tick sends one update to every live subscriber. Channels are
    /// bounded; a subscriber that stops draining loses updates rather than
    /// stalling the frame loop.
    pub fn subscribe(&mut self) -> Receiver<TrackerUpdate> {
        let (tx, rx) = crossbeam_channel::bounded(UPDATE_CHANNEL_CAPACITY);
        self.subscribers.push(tx);
        rx
    }

    /// Pull one frame from `source` and process it
    ///
    /// A source that produces no frame this tick is treated as silence: the
    /// smoother resets and the update carries no pitch.
    ///
    /// # Arguments
    /// * `source` - Frame source to pull from
    pub fn tick(&mut self, source: &mut dyn FrameSource) -> Result<TrackerUpdate, TrackerError> {
        if self.state != TrackerState::Tracking {
            return Err(TrackerError::NotTracking);
        }
        if !source.fill_frame(&mut self.frame) {
            tracing::trace!("no frame available from source");
            self.smoother.reset();
            let update = TrackerUpdate::silent(0.0);
            self.publish(update);
            return Ok(update);
        }
        // Move the buffer out so processing can borrow self mutably
        let frame = std::mem::take(&mut self.frame);
        let result = self.tick_frame(&frame);
        self.frame = frame;
        result
    }

    /// Process one frame the host already holds
    ///
    /// This is the whole per-tick pipeline: detect, compute octave-folded
    /// cents against the target, smooth, publish. Exactly one update is
    /// produced per call.
    ///
    /// # Arguments
    /// * `frame` - One frame of normalized samples, exactly `frame_len` long
    pub fn tick_frame(&mut self, frame: &[f32]) -> Result<TrackerUpdate, TrackerError> {
        if self.state != TrackerState::Tracking {
            return Err(TrackerError::NotTracking);
        }
        if frame.len() != self.detector.frame_len() {
            return Err(TrackerError::FrameLength {
                expected: self.detector.frame_len(),
                actual: frame.len(),
            });
        }

        let level = rms(frame);
        let update = match self.detector.detect(frame) {
            Some(estimate) => {
                let cents = match self.target.get() {
                    Some(target_hz) => {
                        let raw = cents_diff(estimate.frequency_hz, target_hz);
                        Some(self.smoother.push(raw))
                    }
                    None => {
                        // A pitch without a reference has no cents stream to
                        // smooth; keep history empty for the next target.
                        self.smoother.reset();
                        None
                    }
                };
                TrackerUpdate {
                    cents,
                    frequency_hz: Some(estimate.frequency_hz),
                    level,
                }
            }
            None => {
                // Signal lost: stale smoothing must not bridge the gap
                self.smoother.reset();
                TrackerUpdate::silent(level)
            }
        };

        self.publish(update);
        Ok(update)
    }

    /// Fan an update out to subscribers, pruning disconnected ones
    fn publish(&mut self, update: TrackerUpdate) {
        self.subscribers.retain(|tx| {
            match tx.try_send(update) {
                Ok(()) => true,
                Err(crossbeam_channel::TrySendError::Full(_)) => {
                    // Slow consumer; drop this update for them but keep the channel
                    true
                }
                Err(crossbeam_channel::TrySendError::Disconnected(_)) => false,
            }
        });
    }
}
