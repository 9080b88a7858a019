//! Block-streaming synthesis of prepared partials.

mod prepare;
mod render;
mod synthesizer;

pub use prepare::{prepare_partials, PartialStatus, PreparedPartial, SynthesisState};
pub use synthesizer::RealtimeSynthesizer;
