//! Plays a JSON partial list through the default output device, looping it
//! until interrupted.

mod audio_buffer;
mod cpal_host;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

use cpal_host::AudioHost;
use partial_synth::partial::{load_json, sort_by_start_time};
use partial_synth::{BlockRenderer, Partial, RealtimeSynthesizer, SampleRateConfigurable, SynthesizerConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of partials
    #[clap(required_unless_present = "list_hosts")]
    input: Option<PathBuf>,

    /// List the available audio hosts and exit
    #[clap(long)]
    list_hosts: bool,

    /// Audio host to try first (e.g. JACK, ALSA, CoreAudio, WASAPI)
    #[clap(long)]
    host: Option<String>,

    /// JSON synthesizer configuration; the sample rate is taken from the device
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Samples rendered per engine call
    #[clap(short, long, default_value_t = 512)]
    block_size: usize,

    /// Output gain applied after synthesis
    #[clap(short, long, default_value_t = 1.0)]
    gain: f32,

    /// Frequency the material counts as untransposed
    #[clap(long, default_value_t = 0.0)]
    reference_pitch: f64,

    /// Retune so that the reference pitch sounds at this frequency
    #[clap(short, long)]
    pitch: Option<f64>,

    /// Play the material once instead of looping
    #[clap(long)]
    once: bool,
}

/// Feeds the synthesizer to the host, rewinding it whenever it runs out.
struct LoopingPlayer {
    synth: RealtimeSynthesizer,
    gain: f32,
    looping: bool,
    finished: Arc<AtomicBool>,
}

impl BlockRenderer for LoopingPlayer {
    fn render_block(&mut self, output: &mut [f32]) {
        if self.synth.is_finished() {
            if self.looping {
                self.synth.reset();
            } else {
                self.finished.store(true, Ordering::Relaxed);
            }
        }
        self.synth.render_block(output);
        if self.gain != 1.0 {
            for sample in output.iter_mut() {
                *sample *= self.gain;
            }
        }
    }
}

fn build_player(
    base: SynthesizerConfig,
    sample_rate: f64,
    partials: &[Partial],
    args: &Args,
    finished: Arc<AtomicBool>,
) -> anyhow::Result<LoopingPlayer> {
    let mut synth = RealtimeSynthesizer::new(base)?;
    synth
        .configure_sample_rate(sample_rate)
        .context("device sample rate does not suit the synthesizer")?;
    synth.setup(partials, args.reference_pitch);
    if let Some(pitch) = args.pitch {
        synth.set_pitch(pitch);
    }

    println!(
        "Prepared {} partials at {} Hz",
        synth.num_partials(),
        synth.sample_rate()
    );

    Ok(LoopingPlayer {
        synth,
        gain: args.gain,
        looping: !args.once,
        finished,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_hosts {
        println!("=== AVAILABLE AUDIO HOSTS ===");
        for host in AudioHost::list_hosts() {
            let marker = if host.has_default_device { "" } else { " (no output device)" };
            println!("  - {}{}", host.name, marker);
        }
        return Ok(());
    }

    let Some(input) = args.input.as_ref() else {
        anyhow::bail!("no partial file given");
    };
    if args.block_size == 0 {
        anyhow::bail!("block size must be at least one sample");
    }

    let base = match &args.config {
        Some(path) => SynthesizerConfig::load_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SynthesizerConfig::default(),
    };

    let mut partials = load_json(input)
        .with_context(|| format!("failed to read partials from {}", input.display()))?;
    sort_by_start_time(&mut partials);
    info!("Loaded {} partials from {}", partials.len(), input.display());

    let finished = Arc::new(AtomicBool::new(false));
    let host = AudioHost::start(
        |sample_rate| build_player(base, sample_rate, &partials, &args, finished.clone()),
        args.block_size,
        args.host.as_deref(),
    )?;
    info!("Audio host running: {:?}", host.config());

    if args.once {
        println!("Playing once");
    } else {
        println!("Looping, press Ctrl+C to stop");
    }

    while !finished.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
