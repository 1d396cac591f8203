//! Audio processing module
//!
//! This module contains the per-frame analysis pipeline:
//! - Autocorrelation pitch detection ([`detector`])
//! - Median + EMA smoothing of cents deviations ([`smoothing`])
//! - Frame loop, target management, and lifecycle ([`tracker`])
//! - Capture boundary trait ([`source`])
//! - Sine reference signal generation ([`signal`])

pub mod detector;
pub mod signal;
pub mod smoothing;
pub mod source;
pub mod tracker;
