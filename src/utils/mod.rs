pub mod buffer_ops;
pub mod phase;

pub use buffer_ops::*;
pub use phase::*;
