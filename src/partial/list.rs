use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::Partial;
use crate::error::SynthResult;

/// Sorts partials by start time, the order the synthesizer expects.
/// The sort is stable, so partials starting together keep their relative order.
pub fn sort_by_start_time(partials: &mut [Partial]) {
    partials.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));
}

/// Latest end time over all partials, 0 for an empty list.
pub fn max_end_time(partials: &[Partial]) -> f64 {
    partials
        .iter()
        .filter(|p| !p.is_empty())
        .map(Partial::end_time)
        .fold(0.0, f64::max)
}

/// Parses a JSON array of partials.
pub fn from_json_str(json: &str) -> SynthResult<Vec<Partial>> {
    Ok(serde_json::from_str(json)?)
}

pub fn from_json_reader<R: Read>(reader: R) -> SynthResult<Vec<Partial>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Loads a JSON partial list from disk.
pub fn load_json<P: AsRef<Path>>(path: P) -> SynthResult<Vec<Partial>> {
    let file = File::open(path)?;
    from_json_reader(BufReader::new(file))
}
