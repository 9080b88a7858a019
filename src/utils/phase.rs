use std::f64::consts::{PI, TAU};

/// Wraps a phase in radians into (-π, π].
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = (phase + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Converts an absolute time in seconds to the nearest sample index.
/// Negative times map to sample 0.
#[inline]
pub fn time_to_sample(time: f64, sample_rate: f64) -> usize {
    // `as` saturates, so NaN and negative values land on 0
    (time * sample_rate + 0.5).floor().max(0.0) as usize
}
