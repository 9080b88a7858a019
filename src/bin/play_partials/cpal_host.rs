//! CPAL output host: device selection, stream configuration and sample format
//! conversion around a [`CarryBuffer`].

use crate::audio_buffer::CarryBuffer;
use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, HostId, SampleFormat, SizedSample, StreamConfig, SupportedBufferSize};
use dasp_sample::FromSample;
use partial_synth::BlockRenderer;

// Device callback sizes; JACK and ALSA behave best with these
const JACK_HOST_BUFFER: usize = 512;
const ALSA_HOST_BUFFER: usize = 1024;
const DEFAULT_HOST_BUFFER: usize = 512;

const PREFERRED_SAMPLE_RATE: u32 = 48000;

#[derive(Debug, Clone)]
pub struct HostInfo {
    pub name: String,
    pub has_default_device: bool,
}

#[derive(Debug, Clone)]
pub struct AudioHostConfig {
    pub sample_rate: f64,
    pub channels: u16,
    pub engine_block_size: usize,
    pub device_name: String,
    pub host_name: String,
}

/// Keeps an output stream alive for as long as it exists.
pub struct AudioHost {
    _stream: cpal::Stream,
    config: AudioHostConfig,
}

struct SelectedDevice {
    device: cpal::Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    host_name: String,
}

impl AudioHost {
    pub fn list_hosts() -> Vec<HostInfo> {
        cpal::available_hosts()
            .into_iter()
            .filter_map(|id| {
                let host = cpal::host_from_id(id).ok()?;
                Some(HostInfo {
                    name: id.name().to_string(),
                    has_default_device: host.default_output_device().is_some(),
                })
            })
            .collect()
    }

    /// Opens the default output device (trying `preferred_host` first) and
    /// starts playing whatever the renderer built by `factory` produces.
    ///
    /// The factory receives the device sample rate so the engine can be
    /// configured to match it.
    pub fn start<R, F>(
        factory: F,
        engine_block_size: usize,
        preferred_host: Option<&str>,
    ) -> anyhow::Result<Self>
    where
        R: BlockRenderer + Send + 'static,
        F: FnOnce(f64) -> anyhow::Result<R>,
    {
        let selected = select_output_device(preferred_host)?;
        let sample_rate = f64::from(selected.config.sample_rate.0);
        let device_name = selected
            .device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        println!("=== AUDIO CONFIGURATION ===");
        match selected.config.buffer_size {
            BufferSize::Fixed(frames) => println!("Device buffer: {} frames", frames),
            BufferSize::Default => println!("Device buffer: host default"),
        }
        println!("Engine block: {} frames", engine_block_size);
        println!("Sample rate: {} Hz", sample_rate);
        println!("Channels: {}", selected.config.channels);

        let renderer = factory(sample_rate)?;
        let buffer = CarryBuffer::new(renderer, engine_block_size);

        let config = AudioHostConfig {
            sample_rate,
            channels: selected.config.channels,
            engine_block_size,
            device_name,
            host_name: selected.host_name,
        };

        let stream = match selected.sample_format {
            SampleFormat::F32 => build_stream::<f32, R>(&selected.device, &selected.config, buffer)?,
            SampleFormat::I16 => build_stream::<i16, R>(&selected.device, &selected.config, buffer)?,
            SampleFormat::U16 => build_stream::<u16, R>(&selected.device, &selected.config, buffer)?,
            other => anyhow::bail!("unsupported sample format: {:?}", other),
        };
        stream.play().context("failed to start stream")?;

        println!(
            "\n=== NOW PLAYING on '{}' ({}) ===",
            config.device_name, config.host_name
        );

        Ok(Self {
            _stream: stream,
            config,
        })
    }

    pub fn config(&self) -> &AudioHostConfig {
        &self.config
    }
}

fn select_output_device(preferred_host: Option<&str>) -> anyhow::Result<SelectedDevice> {
    let available_hosts = cpal::available_hosts();

    // preferred host first, then the rest in system order
    let mut host_priority: Vec<HostId> = available_hosts
        .iter()
        .copied()
        .filter(|id| Some(id.name()) == preferred_host)
        .collect();
    for id in available_hosts {
        if !host_priority.contains(&id) {
            host_priority.push(id);
        }
    }

    let mut last_error: Option<anyhow::Error> = None;
    for host_id in host_priority {
        let host = cpal::host_from_id(host_id)?;
        let host_name = host_id.name().to_string();

        let Some(device) = host.default_output_device() else {
            last_error = Some(anyhow::anyhow!(
                "host {} has no default output device",
                host_name
            ));
            continue;
        };

        match device.supported_output_configs() {
            Ok(configs) => {
                for supported in configs {
                    let sample_format = supported.sample_format();
                    if !matches!(
                        sample_format,
                        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                    ) {
                        continue;
                    }
                    if supported.min_sample_rate().0 <= PREFERRED_SAMPLE_RATE
                        && supported.max_sample_rate().0 >= PREFERRED_SAMPLE_RATE
                    {
                        let supported =
                            supported.with_sample_rate(cpal::SampleRate(PREFERRED_SAMPLE_RATE));
                        let mut config = supported.config();
                        config.buffer_size = choose_buffer_size(supported.buffer_size(), &host_name);
                        return Ok(SelectedDevice {
                            device,
                            config,
                            sample_format,
                            host_name,
                        });
                    }
                }
            }
            Err(err) => {
                last_error = Some(anyhow::anyhow!(
                    "failed to enumerate output configs for host {}: {}",
                    host_name,
                    err
                ));
            }
        }

        match device.default_output_config() {
            Ok(supported) => {
                let sample_format = supported.sample_format();
                let mut config = supported.config();
                config.buffer_size = choose_buffer_size(supported.buffer_size(), &host_name);
                println!(
                    "Using device default sample rate: {} Hz ({} Hz not available)",
                    config.sample_rate.0, PREFERRED_SAMPLE_RATE
                );
                return Ok(SelectedDevice {
                    device,
                    config,
                    sample_format,
                    host_name,
                });
            }
            Err(err) => {
                last_error = Some(anyhow::anyhow!(
                    "failed to query default output config for host {}: {}",
                    host_name,
                    err
                ));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no usable output device found")))
}

fn choose_buffer_size(supported: &SupportedBufferSize, host_name: &str) -> BufferSize {
    let preferred = match host_name {
        "JACK" => JACK_HOST_BUFFER,
        "ALSA" => ALSA_HOST_BUFFER,
        _ => DEFAULT_HOST_BUFFER,
    } as u32;

    match supported {
        // JACK resizes its period on its own; the carry buffer absorbs it
        SupportedBufferSize::Range { .. } if host_name == "JACK" => BufferSize::Default,
        SupportedBufferSize::Range { min, max } => BufferSize::Fixed(preferred.clamp(*min, *max)),
        SupportedBufferSize::Unknown => BufferSize::Fixed(preferred),
    }
}

fn build_stream<T, R>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut buffer: CarryBuffer<R>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
    R: BlockRenderer + Send + 'static,
{
    let channels = config.channels as usize;
    let mut error_reported = false;

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _| {
                if let Err(err) = buffer.fill_interleaved(data, channels) {
                    if !error_reported {
                        eprintln!("Audio callback error: {}", err);
                        error_reported = true;
                    }
                }
            },
            move |err| {
                eprintln!("Stream error: {}", err);
            },
            None,
        )
        .context("failed to build stream")?;

    Ok(stream)
}
