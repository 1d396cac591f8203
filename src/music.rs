//! Pitch math: frequency/MIDI conversion and octave-folded cents deviation
//!
//! All conversions use equal temperament with A4 = 440 Hz. The cents
//! computation is deliberately octave-agnostic: singing the target pitch one
//! octave away reads as near-zero deviation, because the first-peak
//! autocorrelation search can lock onto an octave-related period for
//! harmonic-rich voices and the fold absorbs that class of glitch.

use crate::{A4_HZ, A4_MIDI};

/// Note names within one octave, starting at C
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a (possibly fractional) MIDI note number to frequency in Hz
///
/// # Example
/// ```
/// use intune_core::music::midi_to_freq;
///
/// assert!((midi_to_freq(69.0) - 440.0).abs() < 1e-9);
/// assert!((midi_to_freq(60.0) - 261.6256).abs() < 1e-3); // C4
/// ```
pub fn midi_to_freq(midi: f64) -> f64 {
    A4_HZ * 2f64.powf((midi - A4_MIDI) / 12.0)
}

/// Convert a frequency in Hz to a fractional MIDI note number
///
/// # Panics
/// Debug-asserts that `freq` is finite and positive; callers upstream
/// (the detector) never emit anything else.
pub fn freq_to_midi(freq: f64) -> f64 {
    debug_assert!(freq.is_finite() && freq > 0.0);
    A4_MIDI + 12.0 * (freq / A4_HZ).log2()
}

/// Signed cents deviation of `input_hz` from `target_hz`, folded into the
/// nearest octave
///
/// Both frequencies are converted to fractional MIDI note numbers, the
/// difference is taken in cents (100 per semitone), and the result is reduced
/// modulo 1200 into `[-600, 600)` centered at zero. Octave errors therefore
/// collapse to the deviation within the nearest octave.
///
/// # Example
/// ```
/// use intune_core::music::cents_diff;
///
/// assert!(cents_diff(440.0, 440.0).abs() < 1e-9);
/// assert!(cents_diff(880.0, 440.0).abs() < 1e-9); // octave up folds to zero
/// ```
pub fn cents_diff(input_hz: f64, target_hz: f64) -> f64 {
    let cents = (freq_to_midi(input_hz) - freq_to_midi(target_hz)) * 100.0;
    // Reduce to [0, 1200), then recenter to [-600, 600)
    let mut folded = cents.rem_euclid(1200.0);
    if folded >= 600.0 {
        folded -= 1200.0;
    }
    folded
}

/// Find the nearest equal-temperament note to a frequency
///
/// Returns the note name with octave (e.g. `"A4"`, `"F#3"`) and the exact
/// frequency of that note. Used for UI readouts next to the cents needle.
///
/// # Arguments
/// * `freq` - Input frequency in Hz (finite, positive)
pub fn nearest_note(freq: f64) -> (String, f64) {
    let midi = freq_to_midi(freq).round();
    let semitone = (midi as i64).rem_euclid(12) as usize;
    // MIDI octaves are offset so that C4 = 60
    let octave = (midi as i64).div_euclid(12) - 1;
    (
        format!("{}{}", NOTE_NAMES[semitone], octave),
        midi_to_freq(midi),
    )
}
