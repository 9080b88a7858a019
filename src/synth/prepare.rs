use crate::partial::{Breakpoint, Partial};
use crate::utils::time_to_sample;

/// Coarse lifecycle of a prepared partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialStatus {
    #[default]
    NotStarted,
    Active,
    Retired,
}

/// Checkpoint that lets a partial resume exactly where its last block ended.
#[derive(Debug, Clone, Default)]
pub struct SynthesisState {
    /// Global index of the next sample this partial has not produced.
    pub current_samp: usize,
    /// Index of the last fully consumed breakpoint. The fade-in anchor at
    /// index 0 counts as consumed from the start.
    pub last_breakpoint: usize,
    pub status: PartialStatus,
    /// Oscillator envelope saved at the end of the previous block.
    pub envelope: Breakpoint,
    /// Frequency in force at the checkpoint, used for phase correction.
    pub prev_frequency: f64,
}

/// A partial in synthesis-ready form: fades inserted, bounds widened, plus the
/// mutable cursor the renderer advances.
#[derive(Debug, Clone)]
pub struct PreparedPartial {
    pub(crate) start_time: f64,
    pub(crate) end_time: f64,
    pub(crate) breakpoints: Vec<Breakpoint>,
    pub(crate) state: SynthesisState,
    // rendering overwrites breakpoint phases with the synthesized ones
    authored_phases: Vec<f64>,
}

impl PreparedPartial {
    /// Builds the synthesis record for `partial`, or `None` if the partial has
    /// nothing to render (no breakpoints, or it starts before time zero).
    ///
    /// A zero-amplitude breakpoint is placed `fade_time` before the first
    /// breakpoint and after the last one. The onset fade is shortened when the
    /// partial starts earlier than `fade_time`.
    pub fn from_partial(partial: &Partial, fade_time: f64) -> Option<Self> {
        let (first, last) = (partial.first()?, partial.last()?);
        if first.time < 0.0 {
            return None;
        }

        let start_time = (first.time - fade_time).max(0.0);
        let end_time = last.time + fade_time;

        let mut breakpoints = Vec::with_capacity(partial.num_breakpoints() + 2);
        breakpoints.push(Breakpoint::null_before(first, first.time - start_time));
        breakpoints.extend(partial.iter().copied());
        breakpoints.push(Breakpoint::null_after(last, fade_time));
        let authored_phases = breakpoints.iter().map(|bp| bp.phase).collect();

        Some(Self {
            start_time,
            end_time,
            breakpoints,
            state: SynthesisState::default(),
            authored_phases,
        })
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn num_breakpoints(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn state(&self) -> &SynthesisState {
        &self.state
    }

    pub fn status(&self) -> PartialStatus {
        self.state.status
    }

    pub fn is_retired(&self) -> bool {
        self.state.status == PartialStatus::Retired
    }

    pub fn start_sample(&self, sample_rate: f64) -> usize {
        time_to_sample(self.start_time, sample_rate)
    }

    /// Forgets everything rendering did: restores the authored phases and
    /// clears the cursor.
    pub(crate) fn rewind(&mut self) {
        for (bp, &phase) in self.breakpoints.iter_mut().zip(&self.authored_phases) {
            bp.phase = phase;
        }
        self.state = SynthesisState::default();
    }

    /// Puts the cursor at the fade-in anchor, ready for a first render at
    /// `start_sample`.
    pub(crate) fn arm(&mut self, start_sample: usize) {
        self.state = SynthesisState {
            current_samp: start_sample,
            last_breakpoint: 0,
            status: PartialStatus::NotStarted,
            envelope: self.breakpoints[0],
            // index 0 is the fade-in, the first real breakpoint follows it
            prev_frequency: self.breakpoints[1].frequency,
        };
    }
}

/// Converts an input partial list, dropping partials with nothing to render.
/// Order is preserved; the caller supplies partials sorted by start time.
pub fn prepare_partials(partials: &[Partial], fade_time: f64) -> Vec<PreparedPartial> {
    partials
        .iter()
        .filter_map(|p| PreparedPartial::from_partial(p, fade_time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn partial(times: &[f64]) -> Partial {
        times
            .iter()
            .map(|&t| Breakpoint::new(t, 100.0 + t, 0.5, 0.1, 0.0))
            .collect()
    }

    #[test]
    fn inserts_fades_at_both_ends() {
        let prepared = PreparedPartial::from_partial(&partial(&[0.5, 0.6, 0.7]), 0.01).unwrap();

        assert_eq!(prepared.num_breakpoints(), 5);
        assert!((prepared.start_time() - 0.49).abs() < EPSILON);
        assert!((prepared.end_time() - 0.71).abs() < EPSILON);

        let bps = prepared.breakpoints();
        assert!((bps[0].time - 0.49).abs() < EPSILON);
        assert!((bps[4].time - 0.71).abs() < EPSILON);
        assert_eq!(bps[0].amplitude, 0.0);
        assert_eq!(bps[4].amplitude, 0.0);
        assert_eq!(bps[0].frequency, bps[1].frequency);
        assert_eq!(bps[0].bandwidth, bps[1].bandwidth);
        assert_eq!(bps[4].frequency, bps[3].frequency);
        assert_eq!(&bps[1..4], partial(&[0.5, 0.6, 0.7]).breakpoints.as_slice());
    }

    #[test]
    fn early_partials_get_shorter_onset_fade() {
        let prepared = PreparedPartial::from_partial(&partial(&[0.004, 0.1]), 0.01).unwrap();

        assert_eq!(prepared.start_time(), 0.0);
        assert_eq!(prepared.breakpoints()[0].time, 0.0);
        // the tail fade keeps its full length
        assert!((prepared.end_time() - 0.11).abs() < EPSILON);
    }

    #[test]
    fn single_breakpoint_partial_is_prepared() {
        let prepared = PreparedPartial::from_partial(&partial(&[1.0]), 0.5).unwrap();
        assert_eq!(prepared.num_breakpoints(), 3);
        assert_eq!(prepared.start_time(), 0.5);
        assert_eq!(prepared.end_time(), 1.5);
    }

    #[test]
    fn degenerate_partials_are_skipped() {
        let partials = vec![
            Partial::default(),
            partial(&[0.1, 0.2]),
            partial(&[-0.5, 0.2]),
            partial(&[0.3]),
        ];
        let prepared = prepare_partials(&partials, 0.001);
        assert_eq!(prepared.len(), 2);
        assert!((prepared[0].start_time() - 0.099).abs() < EPSILON);
        assert!((prepared[1].start_time() - 0.299).abs() < EPSILON);
    }

    #[test]
    fn arm_points_at_fade_in() {
        let mut prepared = PreparedPartial::from_partial(&partial(&[0.5, 0.6]), 0.01).unwrap();
        prepared.state.last_breakpoint = 2;
        prepared.state.status = PartialStatus::Retired;

        prepared.arm(490);
        let state = prepared.state();
        assert_eq!(state.current_samp, 490);
        assert_eq!(state.last_breakpoint, 0);
        assert_eq!(state.status, PartialStatus::NotStarted);
        assert_eq!(state.envelope, prepared.breakpoints()[0]);
        assert_eq!(state.prev_frequency, 100.5);
        assert_eq!(prepared.start_sample(1000.0), 490);
    }

    #[test]
    fn rewind_restores_authored_phases() {
        let mut prepared = PreparedPartial::from_partial(&partial(&[0.5, 0.6]), 0.01).unwrap();
        let authored = prepared.breakpoints().to_vec();
        prepared.arm(490);
        prepared.breakpoints[1].phase = 2.5;
        prepared.state.status = PartialStatus::Active;

        prepared.rewind();
        assert_eq!(prepared.breakpoints(), authored.as_slice());
        assert_eq!(prepared.status(), PartialStatus::NotStarted);
    }
}
