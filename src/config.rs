use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{SynthError, SynthResult};

/// Setup-time parameters of a [`RealtimeSynthesizer`](crate::RealtimeSynthesizer).
///
/// Everything that can be wrong with a synthesizer is wrong here, so this is
/// the only place that validates; the per-block path trusts it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Length in seconds of the synthetic fade-in and fade-out at each partial boundary.
    pub fade_time: f64,
    /// Cutoff in Hz of the low-pass filter shaping bandwidth noise.
    pub noise_cutoff: f64,
    /// Seed of the bandwidth noise source. Replays after `reset` reuse it.
    pub noise_seed: u64,
}

impl SynthesizerConfig {
    pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
    pub const DEFAULT_FADE_TIME: f64 = 0.001;
    pub const DEFAULT_NOISE_CUTOFF: f64 = 500.0;
    pub const DEFAULT_NOISE_SEED: u64 = 0x5eed_1e55;

    pub fn new(sample_rate: f64, fade_time: f64) -> Self {
        Self {
            sample_rate,
            fade_time,
            ..Self::default()
        }
    }

    pub fn with_noise(mut self, cutoff: f64, seed: u64) -> Self {
        self.noise_cutoff = cutoff;
        self.noise_seed = seed;
        self
    }

    /// Reads and validates a JSON configuration. Missing fields take their defaults.
    pub fn load_json<P: AsRef<Path>>(path: P) -> SynthResult<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SynthResult<()> {
        validate_sample_rate(self.sample_rate)?;
        if !self.fade_time.is_finite() || self.fade_time < 0.0 {
            return Err(SynthError::InvalidFadeTime(self.fade_time));
        }
        validate_noise_cutoff(self.noise_cutoff)
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            fade_time: Self::DEFAULT_FADE_TIME,
            noise_cutoff: Self::DEFAULT_NOISE_CUTOFF,
            noise_seed: Self::DEFAULT_NOISE_SEED,
        }
    }
}

pub(crate) fn validate_sample_rate(rate: f64) -> SynthResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidSampleRate(rate))
    }
}

// Cutoffs at or above Nyquist are legal; the noise filter clamps them per rate.
pub(crate) fn validate_noise_cutoff(cutoff: f64) -> SynthResult<()> {
    if cutoff.is_finite() && cutoff > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidNoiseCutoff(cutoff))
    }
}
