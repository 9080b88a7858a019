use std::f64::consts::{PI, TAU};

use super::{NoiseSource, Oscillator};
use crate::partial::Breakpoint;
use crate::utils::wrap_phase;

/// Sinusoid whose amplitude is modulated by band-limited noise in proportion
/// to the envelope's bandwidth:
///
/// `amp * (sqrt(1 - bw) + sqrt(2 bw) * noise) * cos(phase)`
///
/// Frequency, amplitude and bandwidth ramp linearly across each call to
/// [`Oscillator::oscillate`]; phase is integrated from the instantaneous
/// frequency.
#[derive(Debug, Clone)]
pub struct BandwidthEnhancedOscillator {
    // envelope; frequency is unscaled Hz
    frequency: f64,
    amplitude: f64,
    bandwidth: f64,
    phase: f64,

    frequency_scaling: f64,
    noise: NoiseSource,
}

impl BandwidthEnhancedOscillator {
    pub fn new(sample_rate: f64, noise_cutoff: f64, noise_seed: u64) -> Self {
        Self {
            frequency: 0.0,
            amplitude: 0.0,
            bandwidth: 0.0,
            phase: 0.0,
            frequency_scaling: 1.0,
            noise: NoiseSource::new(sample_rate, noise_cutoff, noise_seed),
        }
    }

    pub fn frequency_scaling(&self) -> f64 {
        self.frequency_scaling
    }

    fn load(&mut self, envelope: &Breakpoint) {
        self.frequency = envelope.frequency;
        self.amplitude = envelope.amplitude.max(0.0);
        self.bandwidth = envelope.bandwidth.clamp(0.0, 1.0);
        self.phase = envelope.phase;
    }
}

impl Oscillator for BandwidthEnhancedOscillator {
    fn reset_envelopes(&mut self, bp: &Breakpoint, sample_rate: f64) {
        self.load(bp);
        if self.noise.sample_rate() != sample_rate {
            self.noise.set_sample_rate(sample_rate);
        }
        self.noise.clear_filter();
    }

    fn restore_envelopes(&mut self, envelope: &Breakpoint) {
        self.load(envelope);
    }

    fn envelopes(&self) -> Breakpoint {
        Breakpoint::new(
            0.0,
            self.frequency,
            self.amplitude,
            self.bandwidth,
            self.phase,
        )
    }

    fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }

    fn phase(&self) -> f64 {
        self.phase
    }

    fn amplitude(&self) -> f64 {
        self.amplitude
    }

    fn oscillate(&mut self, buffer: &mut [f32], target: &Breakpoint, sample_rate: f64) {
        let target_amplitude = target.amplitude.max(0.0);
        let target_bandwidth = target.bandwidth.clamp(0.0, 1.0);

        if !buffer.is_empty() {
            // radians per sample
            let radians_per_hz = TAU * self.frequency_scaling / sample_rate;
            let mut freq = self.frequency * radians_per_hz;
            let mut amp = self.amplitude;
            let mut bw = self.bandwidth;
            let mut phase = self.phase;

            let step = 1.0 / buffer.len() as f64;
            let d_freq = (target.frequency * radians_per_hz - freq) * step;
            let d_amp = (target_amplitude - amp) * step;
            let d_bw = (target_bandwidth - bw) * step;

            for sample in buffer.iter_mut() {
                // anything above Nyquist would alias, render it silent
                if amp != 0.0 && freq < PI {
                    let modulation = if bw > 0.0 {
                        (1.0 - bw).sqrt() + (2.0 * bw).sqrt() * self.noise.next_sample()
                    } else {
                        1.0
                    };
                    *sample += (amp * modulation * phase.cos()) as f32;
                }
                phase += freq;
                freq += d_freq;
                amp += d_amp;
                bw += d_bw;
            }
            self.phase = wrap_phase(phase);
        }

        // land exactly on the target, whatever rounding did on the way
        self.frequency = target.frequency;
        self.amplitude = target_amplitude;
        self.bandwidth = target_bandwidth;
    }

    fn set_frequency_scaling(&mut self, ratio: f64) {
        if ratio.is_finite() && ratio > 0.0 {
            self.frequency_scaling = ratio;
        }
    }

    fn reset_noise(&mut self) {
        self.noise.reset();
    }
}
