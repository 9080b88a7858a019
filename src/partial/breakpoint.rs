use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::utils::wrap_phase;

/// One instantaneous sample of a partial's trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Absolute time in seconds.
    pub time: f64,
    /// Frequency in Hz.
    pub frequency: f64,
    /// Linear amplitude.
    pub amplitude: f64,
    /// Fraction of the amplitude carried by noise, 0 to 1.
    #[serde(default)]
    pub bandwidth: f64,
    /// Phase in radians at `time`.
    #[serde(default)]
    pub phase: f64,
}

impl Breakpoint {
    pub fn new(time: f64, frequency: f64, amplitude: f64, bandwidth: f64, phase: f64) -> Self {
        Self {
            time,
            frequency,
            amplitude,
            bandwidth,
            phase,
        }
    }

    /// A purely sinusoidal breakpoint.
    pub fn sinusoidal(time: f64, frequency: f64, amplitude: f64, phase: f64) -> Self {
        Self::new(time, frequency, amplitude, 0.0, phase)
    }

    /// Zero-amplitude breakpoint `fade_time` seconds before `bp`, with its phase
    /// rolled back so a constant-frequency oscillator reaches `bp.phase` on time.
    pub fn null_before(bp: &Breakpoint, fade_time: f64) -> Self {
        Self {
            time: bp.time - fade_time,
            amplitude: 0.0,
            phase: wrap_phase(bp.phase - TAU * bp.frequency * fade_time),
            ..*bp
        }
    }

    /// Zero-amplitude breakpoint `fade_time` seconds after `bp`.
    pub fn null_after(bp: &Breakpoint, fade_time: f64) -> Self {
        Self {
            time: bp.time + fade_time,
            amplitude: 0.0,
            phase: wrap_phase(bp.phase + TAU * bp.frequency * fade_time),
            ..*bp
        }
    }

    /// Linear interpolation of time, frequency, amplitude and bandwidth from `a`
    /// (alpha 0) to `b` (alpha 1). The phase is taken from `a`; oscillators
    /// integrate phase from frequency rather than interpolating it.
    pub fn lerp(a: &Breakpoint, b: &Breakpoint, alpha: f64) -> Self {
        let mix = |x: f64, y: f64| x + (y - x) * alpha;
        Self {
            time: mix(a.time, b.time),
            frequency: mix(a.frequency, b.frequency),
            amplitude: mix(a.amplitude, b.amplitude),
            bandwidth: mix(a.bandwidth, b.bandwidth),
            phase: a.phase,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.amplitude == 0.0
    }
}
