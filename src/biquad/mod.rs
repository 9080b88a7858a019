#[allow(clippy::module_inception)]
mod biquad;

pub use biquad::{Biquad, CascadedBiquad, Filter};
