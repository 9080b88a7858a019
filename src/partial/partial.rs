use serde::{Deserialize, Serialize};

use super::Breakpoint;

/// A time-sorted trajectory of breakpoints describing one sinusoidal-plus-noise
/// component of a sound.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Partial {
    #[serde(default)]
    pub label: i32,
    pub breakpoints: Vec<Breakpoint>,
}

impl Partial {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Self {
        Self {
            label: 0,
            breakpoints,
        }
    }

    pub fn with_label(mut self, label: i32) -> Self {
        self.label = label;
        self
    }

    /// Appends a breakpoint. Callers keep breakpoints in time order.
    pub fn push(&mut self, bp: Breakpoint) {
        self.breakpoints.push(bp);
    }

    pub fn num_breakpoints(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    pub fn first(&self) -> Option<&Breakpoint> {
        self.breakpoints.first()
    }

    pub fn last(&self) -> Option<&Breakpoint> {
        self.breakpoints.last()
    }

    /// Time of the first breakpoint, 0 for an empty partial.
    pub fn start_time(&self) -> f64 {
        self.first().map_or(0.0, |bp| bp.time)
    }

    /// Time of the last breakpoint, 0 for an empty partial.
    pub fn end_time(&self) -> f64 {
        self.last().map_or(0.0, |bp| bp.time)
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.breakpoints.iter()
    }
}

impl FromIterator<Breakpoint> for Partial {
    fn from_iter<I: IntoIterator<Item = Breakpoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Partial {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
