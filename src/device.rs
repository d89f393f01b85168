use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::config::DeviceConfig;
use crate::render::BlockRenderer;

pub struct OutputDevice {
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: usize,
}

impl OutputDevice {
    /// Open the default output device. `config` may pin the sample rate and
    /// channel count; otherwise the device default is used. The renderer is
    /// built once the actual stream format is known.
    pub fn open<F>(config: &DeviceConfig, block_size: usize, make_renderer: F) -> Result<Self>
    where
        F: FnOnce(u32, usize) -> BlockRenderer,
    {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No default output device")?;
        let supported = pick_config(&device, config)?;
        let sample_rate = supported.sample_rate();
        let channels = supported.channels() as usize;
        log::info!(
            "output device: {} ch @ {} Hz, {:?}",
            channels,
            sample_rate,
            supported.sample_format()
        );

        let renderer = make_renderer(sample_rate, channels);
        let cfg: cpal::StreamConfig = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, renderer, block_size)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, renderer, block_size)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, renderer, block_size)?,
            other => anyhow::bail!("Unsupported sample format: {other:?}"),
        };
        stream.play().context("start output stream")?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

fn pick_config(
    device: &cpal::Device,
    config: &DeviceConfig,
) -> Result<cpal::SupportedStreamConfig> {
    let default = device
        .default_output_config()
        .context("No default output config")?;
    if config.sample_rate.is_none() && config.channels.is_none() {
        return Ok(default);
    }
    let want_rate = config.sample_rate.unwrap_or(default.sample_rate());
    let want_channels = config.channels.unwrap_or(default.channels());
    let ranges = device
        .supported_output_configs()
        .context("Query supported output configs")?;
    for range in ranges {
        if range.channels() != want_channels {
            continue;
        }
        if range.min_sample_rate() <= want_rate && want_rate <= range.max_sample_rate() {
            return Ok(range.with_sample_rate(want_rate));
        }
    }
    log::warn!(
        "output device does not support {} ch @ {} Hz; using its default",
        want_channels,
        want_rate
    );
    Ok(default)
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut renderer: BlockRenderer,
    block_size: usize,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = (cfg.channels as usize).max(1);
    let block_size = block_size.max(1);
    // planar scratch, sized up front so the callback never allocates
    let mut scratch: Vec<Vec<f32>> = vec![vec![0.0; block_size]; channels];
    let err_fn = |e| log::error!("cpal stream error: {e}");
    let stream = device.build_output_stream(
        cfg,
        move |data: &mut [T], _| {
            for chunk in data.chunks_mut(block_size * channels) {
                let frames = chunk.len() / channels;
                {
                    let mut outs: [&mut [f32]; 8] = Default::default();
                    let used = channels.min(outs.len());
                    for (slot, buf) in outs.iter_mut().zip(scratch.iter_mut()).take(used) {
                        *slot = &mut buf[..frames];
                    }
                    renderer.produce_block(&mut outs[..used], frames);
                }
                for (i, frame) in chunk.chunks_mut(channels).enumerate() {
                    for (ch, out) in frame.iter_mut().enumerate() {
                        let v = scratch.get(ch).map(|c| c[i]).unwrap_or(0.0);
                        *out = T::from_sample(v.clamp(-1.0, 1.0));
                    }
                }
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}
