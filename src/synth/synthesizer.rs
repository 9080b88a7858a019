use std::collections::VecDeque;

use log::{debug, info};

use super::prepare::{prepare_partials, PreparedPartial};
use super::render::render_partial;
use crate::config::{validate_sample_rate, SynthesizerConfig};
use crate::error::SynthResult;
use crate::oscillator::{BandwidthEnhancedOscillator, Oscillator};
use crate::partial::Partial;
use crate::traits::{BlockRenderer, SampleRateConfigurable};

/// Streams a set of partials out in blocks of arbitrary size.
///
/// Partials are prepared once by [`setup`](Self::setup) and kept in an arena
/// sorted by start time. Each call to [`synthesize_next`](Self::synthesize_next)
/// first advances every active partial through the block, then admits the
/// partials that begin inside it. A partial leaves the active queue once its
/// fade-out has been rendered.
///
/// Only [`setup`](Self::setup) allocates. Per-block work touches the
/// pre-sized queue and the arena in place.
#[derive(Debug)]
pub struct RealtimeSynthesizer<O: Oscillator = BandwidthEnhancedOscillator> {
    config: SynthesizerConfig,
    oscillator: O,
    reference_pitch: f64,

    partials: Vec<PreparedPartial>,
    active: VecDeque<usize>,
    partial_idx: usize,
    processed_samples: usize,
}

impl RealtimeSynthesizer {
    pub fn new(config: SynthesizerConfig) -> SynthResult<Self> {
        config.validate()?;
        let oscillator =
            BandwidthEnhancedOscillator::new(config.sample_rate, config.noise_cutoff, config.noise_seed);
        Self::with_oscillator(config, oscillator)
    }
}

impl<O: Oscillator> RealtimeSynthesizer<O> {
    /// Builds a synthesizer around a caller-supplied oscillator.
    pub fn with_oscillator(config: SynthesizerConfig, oscillator: O) -> SynthResult<Self> {
        config.validate()?;
        info!(
            "Synthesizer created: sample rate {} Hz, fade {} s",
            config.sample_rate, config.fade_time
        );
        Ok(Self {
            config,
            oscillator,
            reference_pitch: 0.0,
            partials: Vec::new(),
            active: VecDeque::new(),
            partial_idx: 0,
            processed_samples: 0,
        })
    }

    /// Replaces the synthesized material with `partials`, which must be sorted
    /// by start time, and rewinds to sample 0.
    ///
    /// `reference_pitch` is the frequency that [`set_pitch`](Self::set_pitch)
    /// treats as "no transposition"; pass 0 to disable retuning.
    pub fn setup(&mut self, partials: &[Partial], reference_pitch: f64) {
        self.partials = prepare_partials(partials, self.config.fade_time);
        self.reference_pitch = reference_pitch;

        let skipped = partials.len() - self.partials.len();
        if skipped > 0 {
            debug!("Skipped {} partials with nothing to render", skipped);
        }

        self.active = VecDeque::with_capacity(self.partials.len());
        self.reset();
        info!(
            "Prepared {} partials, reference pitch {} Hz",
            self.partials.len(),
            reference_pitch
        );
    }

    /// Rewinds to sample 0, keeping the prepared material.
    pub fn reset(&mut self) {
        for partial in &mut self.partials {
            partial.rewind();
        }
        self.active.clear();
        self.partial_idx = 0;
        self.processed_samples = 0;
        self.oscillator.reset_noise();
        debug!("Synthesizer reset");
    }

    /// Retunes everything by `frequency / reference_pitch`. Ignored without a
    /// positive reference pitch or for a frequency that is not positive.
    pub fn set_pitch(&mut self, frequency: f64) {
        if self.reference_pitch > 0.0 && frequency.is_finite() && frequency > 0.0 {
            let scaling = frequency / self.reference_pitch;
            self.oscillator.set_frequency_scaling(scaling);
            debug!("Pitch set to {} Hz, scaling {}", frequency, scaling);
        } else {
            debug!(
                "Pitch {} Hz ignored, reference pitch {} Hz",
                frequency, self.reference_pitch
            );
        }
    }

    /// Overwrites `output` with the next `output.len()` samples.
    pub fn synthesize_next(&mut self, output: &mut [f32]) {
        let block_start = self.processed_samples;
        self.processed_samples += output.len();
        output.fill(0.0);

        let sample_rate = self.config.sample_rate;

        for _ in 0..self.active.len() {
            let Some(index) = self.active.pop_front() else {
                break;
            };
            let partial = &mut self.partials[index];
            render_partial(&mut self.oscillator, partial, output, block_start, sample_rate);
            if !partial.is_retired() {
                self.active.push_back(index);
            }
        }

        while let Some(partial) = self.partials.get_mut(self.partial_idx) {
            let start_sample = partial.start_sample(sample_rate);
            if start_sample >= self.processed_samples {
                break;
            }
            partial.arm(start_sample);
            render_partial(&mut self.oscillator, partial, output, block_start, sample_rate);
            if !partial.is_retired() {
                self.active.push_back(self.partial_idx);
            }
            self.partial_idx += 1;
        }
    }

    pub fn processed_samples(&self) -> usize {
        self.processed_samples
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn num_partials(&self) -> usize {
        self.partials.len()
    }

    /// Every partial has been admitted and rendered to the end of its fade.
    pub fn is_finished(&self) -> bool {
        self.partial_idx == self.partials.len() && self.active.is_empty()
    }

    pub fn partials(&self) -> &[PreparedPartial] {
        &self.partials
    }

    pub fn reference_pitch(&self) -> f64 {
        self.reference_pitch
    }

    pub fn fade_time(&self) -> f64 {
        self.config.fade_time
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn oscillator(&self) -> &O {
        &self.oscillator
    }
}

impl<O: Oscillator> SampleRateConfigurable for RealtimeSynthesizer<O> {
    fn configure_sample_rate(&mut self, sample_rate: f64) -> SynthResult<()> {
        validate_sample_rate(sample_rate)?;
        if sample_rate != self.config.sample_rate {
            info!(
                "Sample rate changed from {} Hz to {} Hz",
                self.config.sample_rate, sample_rate
            );
            self.config.sample_rate = sample_rate;
        }
        Ok(())
    }

    fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }
}

impl<O: Oscillator> BlockRenderer for RealtimeSynthesizer<O> {
    fn render_block(&mut self, output: &mut [f32]) {
        self.synthesize_next(output);
    }
}
