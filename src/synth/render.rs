use std::f64::consts::PI;

use super::prepare::{PartialStatus, PreparedPartial};
use crate::oscillator::Oscillator;
use crate::partial::Breakpoint;
use crate::utils::time_to_sample;

/// Renders as much of `partial` as falls inside the block that starts at
/// global sample `block_start`, adding into `block`.
///
/// The partial resumes from its saved cursor and envelope. Every breakpoint
/// whose target sample lies inside the block is consumed; a segment that runs
/// past the block end is rendered up to the interpolated waypoint at the block
/// boundary and the breakpoint stays pending for the next block. Once the
/// fade-out breakpoint is consumed the partial is marked retired.
pub(crate) fn render_partial<O: Oscillator>(
    osc: &mut O,
    partial: &mut PreparedPartial,
    block: &mut [f32],
    block_start: usize,
    sample_rate: f64,
) {
    if partial.start_time < 0.0 || partial.state.status == PartialStatus::Retired {
        return;
    }

    let PreparedPartial {
        breakpoints, state, ..
    } = partial;
    let block_end = block_start + block.len();

    // only reachable after a sample-rate change moved the start backwards
    if state.current_samp < block_start {
        state.current_samp = block_start;
    }
    if state.current_samp >= block_end {
        return;
    }

    if state.status == PartialStatus::NotStarted {
        osc.reset_envelopes(&breakpoints[0], sample_rate);
        state.status = PartialStatus::Active;
    } else {
        osc.restore_envelopes(&state.envelope);
    }

    let mut index = state.last_breakpoint + 1;
    while index < breakpoints.len() && state.current_samp < block_end {
        let target = &mut breakpoints[index];
        let segment = time_to_sample(target.time, sample_rate).saturating_sub(state.current_samp);
        let available = block_end - state.current_samp;

        // Coming out of silence: back-date the phase so that integrating the
        // frequency ramp over the whole segment lands on the stored phase.
        if osc.amplitude() == 0.0 && !target.is_silent() {
            let travel = PI * (state.prev_frequency + target.frequency) * segment as f64 / sample_rate;
            osc.set_phase(target.phase - travel);
        }

        let offset = state.current_samp - block_start;
        if segment <= available {
            osc.oscillate(&mut block[offset..offset + segment], target, sample_rate);
            target.phase = osc.phase();
            state.prev_frequency = target.frequency;
            state.last_breakpoint = index;
            state.current_samp += segment;
            index += 1;
        } else {
            let alpha = available as f64 / segment as f64;
            let mut waypoint = Breakpoint::lerp(&osc.envelopes(), target, alpha);
            waypoint.time = block_end as f64 / sample_rate;
            osc.oscillate(&mut block[offset..], &waypoint, sample_rate);
            state.prev_frequency = waypoint.frequency;
            state.current_samp = block_end;
        }
    }

    if state.last_breakpoint + 1 == breakpoints.len() {
        state.status = PartialStatus::Retired;
    }
    state.envelope = osc.envelopes();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::BandwidthEnhancedOscillator;
    use crate::partial::Partial;
    use std::f64::consts::TAU;

    const SAMPLE_RATE: f64 = 1000.0;

    fn oscillator() -> BandwidthEnhancedOscillator {
        BandwidthEnhancedOscillator::new(SAMPLE_RATE, 100.0, 9)
    }

    fn prepared(bps: &[(f64, f64, f64)], fade: f64) -> PreparedPartial {
        let partial: Partial = bps
            .iter()
            .map(|&(t, f, a)| Breakpoint::sinusoidal(t, f, a, 0.0))
            .collect();
        let mut prepared = PreparedPartial::from_partial(&partial, fade).unwrap();
        let start = prepared.start_sample(SAMPLE_RATE);
        prepared.arm(start);
        prepared
    }

    #[test]
    fn whole_partial_in_one_block() {
        let mut osc = oscillator();
        let mut partial = prepared(&[(0.01, 50.0, 1.0), (0.03, 50.0, 1.0)], 0.01);
        let mut block = vec![0.0f32; 64];

        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);

        assert!(partial.is_retired());
        assert_eq!(partial.state().current_samp, 40);
        assert_eq!(partial.state().last_breakpoint, 3);
        assert!(block[40..].iter().all(|&s| s == 0.0));
        assert!(block[10..30].iter().any(|&s| s.abs() > 0.9));
    }

    #[test]
    fn clipped_segment_stays_pending() {
        let mut osc = oscillator();
        let mut partial = prepared(&[(0.01, 50.0, 1.0), (0.05, 50.0, 1.0)], 0.01);
        let mut block = vec![0.0f32; 32];

        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);

        let state = partial.state().clone();
        assert_eq!(state.status, PartialStatus::Active);
        assert_eq!(state.current_samp, 32);
        // fade-in and first breakpoint consumed, segment to 0.05 clipped
        assert_eq!(state.last_breakpoint, 1);
        assert_eq!(state.envelope.amplitude, 1.0);

        let mut next = vec![0.0f32; 32];
        render_partial(&mut osc, &mut partial, &mut next, 32, SAMPLE_RATE);
        assert_eq!(partial.state().last_breakpoint, 3);
        assert_eq!(partial.state().current_samp, 60);
        assert!(next[28..].iter().all(|&s| s == 0.0));
        assert!(partial.is_retired());
    }

    #[test]
    fn clipped_waypoint_is_interpolated() {
        let mut osc = oscillator();
        // no fade to speak of, ramp 0 -> 1 over 100 samples
        let mut partial = prepared(&[(0.0, 10.0, 0.0), (0.1, 10.0, 1.0)], 0.0);
        let mut block = vec![0.0f32; 25];

        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);
        assert!((partial.state().envelope.amplitude - 0.25).abs() < 1e-12);
        assert_eq!(partial.state().prev_frequency, 10.0);
    }

    #[test]
    fn later_start_writes_at_block_offset() {
        let mut osc = oscillator();
        let mut partial = prepared(&[(0.02, 50.0, 1.0), (0.03, 50.0, 1.0)], 0.005);
        let mut block = vec![0.0f32; 64];

        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);

        assert!(block[..15].iter().all(|&s| s == 0.0));
        assert!(block[15..35].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn onset_lands_on_stored_phase() {
        let mut osc = oscillator();
        let stored = 1.0;
        let partial: Partial = [
            Breakpoint::sinusoidal(0.02, 50.0, 1.0, stored),
            Breakpoint::sinusoidal(0.05, 50.0, 1.0, 0.0),
        ]
        .into_iter()
        .collect();
        let mut partial = PreparedPartial::from_partial(&partial, 0.01).unwrap();
        partial.arm(partial.start_sample(SAMPLE_RATE));

        // stop right at the first real breakpoint
        let mut block = vec![0.0f32; 20];
        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);
        assert_eq!(partial.state().last_breakpoint, 1);

        let landed = partial.breakpoints()[1].phase;
        let diff = crate::utils::wrap_phase(landed - stored).abs();
        assert!(diff < TAU * 50.0 / SAMPLE_RATE, "{diff}");
    }

    #[test]
    fn retired_partial_is_left_alone() {
        let mut osc = oscillator();
        let mut partial = prepared(&[(0.0, 50.0, 1.0)], 0.001);
        partial.state.status = PartialStatus::Retired;
        let mut block = vec![0.0f32; 16];

        render_partial(&mut osc, &mut partial, &mut block, 0, SAMPLE_RATE);
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(partial.state().current_samp, 0);
    }
}
