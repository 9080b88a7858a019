use crate::error::SynthResult;

/// Anything whose output depends on the sample rate it was configured for.
pub trait SampleRateConfigurable {
    /// Switches to `sample_rate`, rejecting values the engine cannot run at.
    /// Content already prepared is kept.
    fn configure_sample_rate(&mut self, sample_rate: f64) -> SynthResult<()>;

    fn sample_rate(&self) -> f64;
}

/// A source of mono audio that a host pulls one block at a time.
pub trait BlockRenderer {
    /// Overwrites `output` with the next `output.len()` samples.
    fn render_block(&mut self, output: &mut [f32]);
}
