//! Renders a JSON partial list to a mono 32-bit float WAV file, pulling the
//! audio through the synthesizer one block at a time like a real-time host.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use partial_synth::partial::{load_json, sort_by_start_time};
use partial_synth::{peak_level, BlockRenderer, RealtimeSynthesizer, SynthesizerConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of partials
    input: PathBuf,

    /// WAV file to write
    #[clap(short, long, default_value = "partials.wav")]
    output: PathBuf,

    /// JSON synthesizer configuration; individual flags override it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Output sample rate in Hz
    #[clap(short, long)]
    sample_rate: Option<f64>,

    /// Fade-in/fade-out length at partial boundaries, in seconds
    #[clap(short, long)]
    fade_time: Option<f64>,

    /// Cutoff of the bandwidth noise filter in Hz
    #[clap(long)]
    noise_cutoff: Option<f64>,

    /// Seed of the bandwidth noise source
    #[clap(long)]
    seed: Option<u64>,

    /// Samples requested per synthesis call
    #[clap(short, long, default_value_t = 512)]
    block_size: usize,

    /// Frequency the material counts as untransposed
    #[clap(long, default_value_t = 0.0)]
    reference_pitch: f64,

    /// Retune so that the reference pitch sounds at this frequency
    #[clap(short, long)]
    pitch: Option<f64>,
}

impl Args {
    fn synth_config(&self) -> anyhow::Result<SynthesizerConfig> {
        let mut config = match &self.config {
            Some(path) => SynthesizerConfig::load_json(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SynthesizerConfig::default(),
        };
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(fade) = self.fade_time {
            config.fade_time = fade;
        }
        if let Some(cutoff) = self.noise_cutoff {
            config.noise_cutoff = cutoff;
        }
        if let Some(seed) = self.seed {
            config.noise_seed = seed;
        }
        config.validate().context("invalid synthesizer configuration")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.block_size == 0 {
        anyhow::bail!("block size must be at least one sample");
    }
    if args.pitch.is_some() && args.reference_pitch <= 0.0 {
        anyhow::bail!("--pitch needs a positive --reference-pitch");
    }

    let config = args.synth_config()?;

    let mut partials = load_json(&args.input)
        .with_context(|| format!("failed to read partials from {}", args.input.display()))?;
    sort_by_start_time(&mut partials);
    info!("Loaded {} partials from {}", partials.len(), args.input.display());

    let mut synth = RealtimeSynthesizer::new(config)?;
    synth.setup(&partials, args.reference_pitch);
    if let Some(pitch) = args.pitch {
        synth.set_pitch(pitch);
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: synth.config().sample_rate.round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let mut block = vec![0.0f32; args.block_size];
    let mut peak = 0.0f32;
    let mut blocks = 0usize;
    while !synth.is_finished() {
        synth.render_block(&mut block);
        peak = peak.max(peak_level(&block));
        for &sample in &block {
            writer.write_sample(sample)?;
        }
        blocks += 1;
    }
    writer.finalize().context("failed to finalize WAV file")?;

    println!(
        "Rendered {} partials into {} ({} samples in {} blocks of {})",
        synth.num_partials(),
        args.output.display(),
        synth.processed_samples(),
        blocks,
        args.block_size
    );
    println!("Peak level: {:.4}", peak);
    if peak > 1.0 {
        println!("Warning: output clips, consider scaling the partial amplitudes");
    }

    Ok(())
}
