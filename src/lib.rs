pub mod biquad;
pub mod config;
pub mod error;
pub mod oscillator;
pub mod partial;
pub mod synth;
pub mod traits;
pub mod utils;

pub use config::SynthesizerConfig;
pub use error::{SynthError, SynthResult};
pub use oscillator::{BandwidthEnhancedOscillator, Oscillator};
pub use partial::{Breakpoint, Partial};
pub use synth::{PartialStatus, PreparedPartial, RealtimeSynthesizer};
pub use traits::{BlockRenderer, SampleRateConfigurable};
pub use utils::*;
