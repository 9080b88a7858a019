mod breakpoint;
pub mod list;
#[allow(clippy::module_inception)]
mod partial;

pub use breakpoint::Breakpoint;
pub use list::{from_json_reader, from_json_str, load_json, max_end_time, sort_by_start_time};
pub use partial::Partial;
