//! Sine reference signal generation
//!
//! Generates a phase-continuous sine tone at a fixed frequency. Used as a
//! known-pitch reference input by the detector and tracker tests, and usable
//! by hosts as a calibration tone.

use crate::audio::source::FrameSource;

/// Phase-accumulating sine generator
///
/// Produces `amplitude * sin(2*pi*frequency*t)` one sample at a time. Phase is
/// accumulated in cycles and wrapped every sample, so arbitrarily long streams
/// stay frequency-accurate.
///
/// # Example
/// ```
/// use intune_core::audio::signal::SineGenerator;
///
/// let mut gen = SineGenerator::new(440.0, 48_000);
/// let mut frame = [0.0f32; 2048];
/// gen.fill_buffer(&mut frame);
/// assert!(frame.iter().any(|&s| s > 0.4));
/// ```
#[derive(Debug, Clone)]
pub struct SineGenerator {
    /// Tone frequency in Hz
    frequency: f64,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Current phase in cycles, always in [0, 1)
    phase: f64,
    /// Amplitude scaling factor
    amplitude: f32,
}

impl SineGenerator {
    /// Create a new sine generator
    ///
    /// # Arguments
    /// * `frequency` - Tone frequency in Hz
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Panics
    /// Panics if `frequency` is not finite and positive, or if `sample_rate`
    /// is zero
    pub fn new(frequency: f64, sample_rate: u32) -> Self {
        assert!(
            frequency.is_finite() && frequency > 0.0,
            "Frequency must be finite and positive"
        );
        assert!(sample_rate > 0, "Sample rate must be non-zero");

        Self {
            frequency,
            sample_rate,
            phase: 0.0,
            amplitude: 0.5, // -6dB to leave headroom
        }
    }

    /// Get the next sample from the tone
    pub fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * std::f64::consts::TAU).sin() as f32 * self.amplitude;
        self.phase += self.frequency / self.sample_rate as f64;
        self.phase -= self.phase.floor();
        sample
    }

    /// Fill a buffer with sequential samples
    ///
    /// # Arguments
    /// * `buffer` - Buffer to fill with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Get the tone frequency in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Change the tone frequency, keeping phase continuous
    pub fn set_frequency(&mut self, frequency: f64) {
        assert!(
            frequency.is_finite() && frequency > 0.0,
            "Frequency must be finite and positive"
        );
        self.frequency = frequency;
    }

    /// Reset phase to the start of a cycle
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Set the amplitude scaling factor
    ///
    /// # Arguments
    /// * `amplitude` - Amplitude from 0.0 to 1.0
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.clamp(0.0, 1.0);
    }

    /// Get the current amplitude
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

impl FrameSource for SineGenerator {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn fill_frame(&mut self, frame: &mut [f32]) -> bool {
        self.fill_buffer(frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sine_starts_at_zero_crossing() {
        let mut gen = SineGenerator::new(440.0, 48_000);
        assert_abs_diff_eq!(gen.next_sample(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sine_period() {
        // 480Hz at 48kHz has an exact 100-sample period
        let mut gen = SineGenerator::new(480.0, 48_000);
        let first: Vec<f32> = (0..100).map(|_| gen.next_sample()).collect();
        let second: Vec<f32> = (0..100).map(|_| gen.next_sample()).collect();

        for (a, b) in first.iter().zip(&second) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sine_amplitude() {
        let mut gen = SineGenerator::new(440.0, 48_000);
        gen.set_amplitude(0.25);

        for _ in 0..1000 {
            assert!(gen.next_sample().abs() <= 0.2500001);
        }
    }

    #[test]
    fn test_sine_reset() {
        let mut gen = SineGenerator::new(333.0, 48_000);
        let first = gen.next_sample();
        for _ in 0..57 {
            gen.next_sample();
        }
        gen.reset();
        assert_abs_diff_eq!(gen.next_sample(), first, epsilon = 1e-6);
    }

    #[test]
    #[should_panic]
    fn test_sine_rejects_zero_frequency() {
        SineGenerator::new(0.0, 48_000);
    }
}
