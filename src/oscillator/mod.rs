//! Sample-generating collaborators driven by the partial renderer.

mod bandwidth_enhanced;
pub mod noise;

pub use bandwidth_enhanced::BandwidthEnhancedOscillator;
pub use noise::NoiseSource;

use crate::partial::Breakpoint;

/// What the partial renderer needs from an oscillator.
///
/// An oscillator tracks one envelope (frequency, amplitude, bandwidth, phase)
/// at a time. The renderer shares a single oscillator between all partials by
/// saving the envelope after each partial's block with [`envelopes`] and
/// loading it back with [`restore_envelopes`].
///
/// [`envelopes`]: Oscillator::envelopes
/// [`restore_envelopes`]: Oscillator::restore_envelopes
pub trait Oscillator {
    /// Starts a fresh trajectory at `bp`.
    fn reset_envelopes(&mut self, bp: &Breakpoint, sample_rate: f64);

    /// Resumes a trajectory previously captured with [`Oscillator::envelopes`].
    fn restore_envelopes(&mut self, envelope: &Breakpoint);

    /// Current envelope, phase included. The `time` field is not meaningful.
    fn envelopes(&self) -> Breakpoint;

    fn set_phase(&mut self, phase: f64);
    fn phase(&self) -> f64;
    fn amplitude(&self) -> f64;

    /// Adds `buffer.len()` samples to `buffer`, ramping linearly from the
    /// current envelope to `target`. On return the envelope equals `target`
    /// except for phase, which is whatever the ramp integrated to.
    fn oscillate(&mut self, buffer: &mut [f32], target: &Breakpoint, sample_rate: f64);

    /// Multiplier applied to every frequency before synthesis.
    fn set_frequency_scaling(&mut self, ratio: f64);

    /// Restarts any internal noise source from its initial state.
    fn reset_noise(&mut self) {}
}
