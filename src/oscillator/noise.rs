//! Band-limited Gaussian noise used to modulate bandwidth-enhanced partials.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use crate::biquad::{CascadedBiquad, Filter};

const FILTER_Q: f64 = 0.707;

/// Gaussian white noise shaped by a low-pass cascade and scaled back to
/// roughly unit variance.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    seed: u64,
    cutoff: f64,
    rng: StdRng,
    spare: Option<f64>,
    filter: CascadedBiquad,
    gain: f64,
}

impl NoiseSource {
    /// The filter holds `cutoff` below Nyquist, so a cutoff above half the
    /// rate only widens the noise to the full band.
    pub fn new(sample_rate: f64, cutoff: f64, seed: u64) -> Self {
        let filter = CascadedBiquad::low_pass(sample_rate, cutoff, FILTER_Q);
        Self {
            seed,
            cutoff,
            rng: StdRng::seed_from_u64(seed),
            spare: None,
            gain: Self::gain_for(sample_rate, filter.first.frequency),
            filter,
        }
    }

    // White noise variance spread over sr/2 Hz, of which roughly `cutoff` Hz survives.
    fn gain_for(sample_rate: f64, cutoff: f64) -> f64 {
        (sample_rate / (2.0 * cutoff)).sqrt()
    }

    /// Re-designs the filter for a new rate from the requested cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.filter = CascadedBiquad::low_pass(sample_rate, self.cutoff, FILTER_Q);
        self.gain = Self::gain_for(sample_rate, self.filter.first.frequency);
    }

    pub fn sample_rate(&self) -> f64 {
        self.filter.first.sample_rate
    }

    /// Cutoff the filter is actually running at.
    pub fn effective_cutoff(&self) -> f64 {
        self.filter.first.frequency
    }

    /// Clears the filter memory without touching the random sequence.
    pub fn clear_filter(&mut self) {
        self.filter.reset();
    }

    /// Restarts the random sequence from the seed and clears the filter.
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.spare = None;
        self.filter.reset();
    }

    /// Standard normal deviate (Box-Muller, both outputs used).
    fn gaussian(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // 1 - [0, 1) keeps the logarithm finite
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = TAU * u2;
        self.spare = Some(radius * angle.sin());
        radius * angle.cos()
    }

    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let white = self.gaussian();
        self.filter.process(white) * self.gain
    }
}
