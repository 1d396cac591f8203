//! Capture boundary for the frame loop
//!
//! Audio capture and device management live outside this crate. The tracker
//! only needs something it can pull one frame from per tick; hosts adapt
//! their capture stack (ring buffer drain, callback queue, file reader) to
//! this trait.

/// A source of fixed-length audio frames
///
/// Implementations must be non-blocking: if a full frame is not available
/// right now, return `false` and leave the buffer contents unspecified. The
/// tracker treats an unavailable frame like silence for that tick.
pub trait FrameSource {
    /// Sample rate of the frames this source produces, in Hz
    fn sample_rate(&self) -> u32;

    /// Fill `frame` with the next frame of normalized samples
    ///
    /// # Returns
    /// `true` if the frame was filled, `false` if no frame was available
    fn fill_frame(&mut self, frame: &mut [f32]) -> bool;
}
