/// Largest absolute sample value in `buffer`.
pub fn peak_level(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Largest absolute difference between neighbouring samples. A cheap click
/// detector: smooth material stays well below its own peak level.
pub fn max_step(buffer: &[f32]) -> f32 {
    buffer
        .windows(2)
        .fold(0.0f32, |step, w| step.max((w[1] - w[0]).abs()))
}
