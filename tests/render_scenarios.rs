use more_asserts::{assert_gt, assert_lt};

use partial_synth::partial::{from_json_reader, from_json_str, max_end_time, sort_by_start_time};
use partial_synth::{
    max_step, peak_level, time_to_sample, BlockRenderer, Breakpoint, Partial, RealtimeSynthesizer,
    SynthError, SynthesizerConfig,
};

const PARTIALS_JSON: &str = r#"[
    {
        "label": 2,
        "breakpoints": [
            { "time": 0.20, "frequency": 660.0, "amplitude": 0.2, "bandwidth": 0.4 },
            { "time": 0.35, "frequency": 665.0, "amplitude": 0.1, "bandwidth": 0.5 }
        ]
    },
    {
        "breakpoints": [
            { "time": 0.0, "frequency": 220.0, "amplitude": 0.0 },
            { "time": 0.1, "frequency": 220.0, "amplitude": 0.5, "phase": 1.2 },
            { "time": 0.3, "frequency": 218.0, "amplitude": 0.4 },
            { "time": 0.4, "frequency": 218.0, "amplitude": 0.0 }
        ]
    },
    { "label": 7, "breakpoints": [] }
]"#;

fn synth(sample_rate: f64) -> RealtimeSynthesizer {
    RealtimeSynthesizer::new(SynthesizerConfig::new(sample_rate, 0.005)).unwrap()
}

fn render_to_end(synth: &mut RealtimeSynthesizer, block_size: usize) -> Vec<f32> {
    let mut out = Vec::new();
    let mut block = vec![0.0f32; block_size];
    while !synth.is_finished() {
        synth.render_block(&mut block);
        out.extend_from_slice(&block);
    }
    out
}

#[test]
fn renders_json_material_to_the_end() {
    let mut partials = from_json_str(PARTIALS_JSON).unwrap();
    assert_eq!(partials.len(), 3);
    sort_by_start_time(&mut partials);
    // stable: the empty partial keeps its place after the other one at t = 0
    assert_eq!(partials[1].label, 7);
    assert_eq!(partials[2].label, 2);

    let sample_rate = 22_050.0;
    let mut synth = synth(sample_rate);
    synth.setup(&partials, 0.0);
    assert_eq!(synth.num_partials(), 2);

    let out = render_to_end(&mut synth, 256);
    let end = time_to_sample(max_end_time(&partials) + synth.fade_time(), sample_rate);

    assert_eq!(out.len(), synth.processed_samples());
    assert!(out.len() >= end && out.len() < end + 256);
    assert!(out[end..].iter().all(|&s| s == 0.0));
    assert_gt!(peak_level(&out), 0.3);
}

#[test]
fn replay_after_reset_matches() {
    let mut partials = from_json_str(PARTIALS_JSON).unwrap();
    sort_by_start_time(&mut partials);

    let mut synth = synth(16_000.0);
    synth.setup(&partials, 0.0);
    let first = render_to_end(&mut synth, 100);
    synth.reset();
    let second = render_to_end(&mut synth, 100);

    assert_eq!(first, second);
}

#[test]
fn block_boundaries_leave_no_clicks() {
    let mut partials = from_json_str(PARTIALS_JSON).unwrap();
    sort_by_start_time(&mut partials);
    // sinusoidal material only, so the waveform slope is bounded
    partials.retain(|p| p.iter().all(|bp| bp.bandwidth == 0.0));

    let sample_rate = 16_000.0;
    let mut synth = synth(sample_rate);
    synth.setup(&partials, 0.0);
    let out = render_to_end(&mut synth, 37);

    // |d/dn a cos(wn)| <= a w, with a <= 0.5 and w at 220 Hz
    let bound = 0.5 * std::f64::consts::TAU * 220.0 / sample_rate;
    assert_lt!(max_step(&out) as f64, bound * 1.05);
}

#[test]
fn reader_and_string_loading_agree() {
    let from_str = from_json_str(PARTIALS_JSON).unwrap();
    let from_reader = from_json_reader(PARTIALS_JSON.as_bytes()).unwrap();
    assert_eq!(from_str, from_reader);
}

#[test]
fn low_rates_render_with_default_noise() {
    let noisy = Partial::new(vec![
        Breakpoint::new(0.0, 110.0, 0.0, 0.5, 0.0),
        Breakpoint::new(0.2, 110.0, 0.5, 0.5, 0.0),
        Breakpoint::new(0.4, 110.0, 0.0, 0.5, 0.0),
    ]);

    for sample_rate in [1000.0, 800.0, 300.0] {
        let mut synth = RealtimeSynthesizer::new(SynthesizerConfig::new(sample_rate, 0.0)).unwrap();
        synth.setup(std::slice::from_ref(&noisy), 0.0);
        let out = render_to_end(&mut synth, 64);
        assert!(out.iter().all(|s| s.is_finite()), "{sample_rate}");
        assert_gt!(peak_level(&out), 0.0);
    }
}

#[test]
fn malformed_json_is_reported() {
    let err = from_json_str(r#"[{ "breakpoints": [{ "time": "soon" }] }]"#).unwrap_err();
    assert!(matches!(err, SynthError::Json(_)));
}

#[test]
fn invalid_sample_rate_is_rejected() {
    let err = RealtimeSynthesizer::new(SynthesizerConfig::new(0.0, 0.001)).unwrap_err();
    assert!(matches!(err, SynthError::InvalidSampleRate(r) if r == 0.0));
}
