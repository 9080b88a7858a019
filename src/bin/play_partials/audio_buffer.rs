//! Carry buffer between the fixed engine block size and whatever frame count
//! the device callback asks for.

use dasp_sample::FromSample;
use partial_synth::BlockRenderer;

pub(crate) struct CarryBuffer<R: BlockRenderer> {
    pub(crate) renderer: R,
    carry: Vec<f32>,
    carry_index: usize,
    carry_available: usize,
    pub(crate) call_count: usize,
}

impl<R: BlockRenderer> CarryBuffer<R> {
    pub(crate) fn new(renderer: R, engine_block_size: usize) -> Self {
        Self {
            renderer,
            carry: vec![0.0; engine_block_size.max(1)],
            carry_index: 0,
            carry_available: 0,
            call_count: 0,
        }
    }

    /// Fills an interleaved device buffer, copying the mono engine output to
    /// every channel and rendering fresh engine blocks as the carry runs dry.
    pub(crate) fn fill_interleaved<T: FromSample<f32>>(
        &mut self,
        output: &mut [T],
        channels: usize,
    ) -> Result<(), &'static str> {
        self.call_count += 1;

        if channels == 0 {
            return Err("no output channels available");
        }
        if output.len() % channels != 0 {
            return Err("output buffer length not divisible by channel count");
        }

        let total_frames = output.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            if self.carry_available == 0 {
                self.renderer.render_block(&mut self.carry);
                self.carry_index = 0;
                self.carry_available = self.carry.len();
                continue;
            }

            let frames_to_copy = (total_frames - frames_written).min(self.carry_available);
            let source = &self.carry[self.carry_index..self.carry_index + frames_to_copy];
            let target = &mut output[frames_written * channels..(frames_written + frames_to_copy) * channels];

            for (frame, &value) in target.chunks_exact_mut(channels).zip(source) {
                for sample in frame {
                    *sample = T::from_sample_(value);
                }
            }

            frames_written += frames_to_copy;
            self.carry_index += frames_to_copy;
            self.carry_available -= frames_to_copy;
        }

        Ok(())
    }
}
