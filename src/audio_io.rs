use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::buffer::SampleMatrix;

pub const SUPPORTED_EXTS: &[&str] = &["wav", "mp3", "m4a", "ogg"];

#[derive(Clone, Copy, Debug)]
pub struct AudioInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub duration_secs: Option<f32>,
}

/// Decoded PCM plus the properties the editor needs.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn into_matrix(self) -> Result<(SampleMatrix, u32)> {
        let matrix = SampleMatrix::from_channels(self.channels).context("decoded channels")?;
        Ok((matrix, self.sample_rate))
    }
}

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTS.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

pub fn is_supported_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(is_supported_extension)
        .unwrap_or(false)
}

fn sanitize_non_finite(path: &Path, channels: &mut [Vec<f32>]) {
    let mut replaced = 0usize;
    for ch in channels.iter_mut() {
        for v in ch.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
                replaced += 1;
            }
        }
    }
    if replaced > 0 {
        log::warn!(
            "decode {}: replaced {replaced} non-finite samples",
            path.display()
        );
    }
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let ext_hint = path.extension().and_then(|s| s.to_str());
    let probe_once = |hint_ext: Option<&str>| -> Result<Box<dyn FormatReader>> {
        let file = File::open(path).with_context(|| format!("open audio: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = hint_ext {
            hint.with_extension(ext);
        }
        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        Ok(probed.format)
    };
    match probe_once(ext_hint) {
        Ok(v) => Ok(v),
        Err(first_err) if ext_hint.is_some() => probe_once(None).with_context(|| {
            format!(
                "probe failed with and without hint ({first_err:#}): {}",
                path.display()
            )
        }),
        Err(err) => Err(err),
    }
}

pub fn read_audio_info(path: &Path) -> Result<AudioInfo> {
    let format = open_format(path)?;
    let track = format.default_track().context("no default track")?;
    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);
    let bits_per_sample = params
        .bits_per_sample
        .or(params.bits_per_coded_sample)
        .unwrap_or(0) as u16;
    let duration_secs = match (params.n_frames, sample_rate) {
        (Some(frames), sr) if sr > 0 => Some(frames as f32 / sr as f32),
        _ => None,
    };
    Ok(AudioInfo {
        channels,
        sample_rate,
        bits_per_sample,
        duration_secs,
    })
}

pub fn decode_audio_multi(path: &Path) -> Result<DecodedAudio> {
    let mut format = open_format(path)?;
    let track = format.default_track().context("no default track")?.clone();
    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("no decoder for {}", path.display()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut chans: Vec<Vec<f32>> = Vec::new();
    let mut decode_errors = 0u32;
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::DecodeError(_)) => {
                decode_errors = decode_errors.saturating_add(1);
                continue;
            }
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                decode_errors = decode_errors.saturating_add(1);
                continue;
            }
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if sample_rate == 0 {
            sample_rate = decoded.spec().rate;
        }
        let channels = decoded.spec().channels.count().max(1);
        if chans.is_empty() {
            chans = vec![Vec::new(); channels];
        }
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks(channels) {
            for (ci, &v) in frame.iter().enumerate().take(chans.len()) {
                chans[ci].push(v);
            }
        }
    }
    if sample_rate == 0 {
        anyhow::bail!("unknown sample rate: {}", path.display());
    }
    if chans.is_empty() {
        anyhow::bail!("no audio frames decoded: {}", path.display());
    }
    if decode_errors > 0 {
        log::warn!(
            "decode {}: skipped {decode_errors} corrupt packets",
            path.display()
        );
    }
    sanitize_non_finite(path, &mut chans);
    log::debug!(
        "decode {} sr={sample_rate} ch={} frames={}",
        path.display(),
        chans.len(),
        chans.first().map(|c| c.len()).unwrap_or(0)
    );
    Ok(DecodedAudio {
        channels: chans,
        sample_rate,
    })
}

/// Write `matrix` as integer PCM WAV (16/24/32-bit); samples are clipped to [-1, 1].
pub fn encode_wav(matrix: &SampleMatrix, sample_rate: u32, bit_depth: u16, dst: &Path) -> Result<()> {
    if !matches!(bit_depth, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth: {bit_depth}");
    }
    let channels = matrix.num_channels();
    if channels == 0 || channels > u16::MAX as usize {
        anyhow::bail!("cannot encode {channels} channels");
    }
    let spec = hound::WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: bit_depth,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(dst, spec)
        .with_context(|| format!("create wav: {}", dst.display()))?;
    let full_scale = ((1i64 << (bit_depth - 1)) - 1) as f64;
    for i in 0..matrix.num_samples() {
        for ci in 0..channels {
            let v = matrix.channel(ci)[i].clamp(-1.0, 1.0) as f64;
            writer.write_sample((v * full_scale).round() as i32)?;
        }
    }
    writer
        .finalize()
        .with_context(|| format!("finalize wav: {}", dst.display()))?;
    log::info!(
        "saved {} ({} ch, {} Hz, {}-bit, {} frames)",
        dst.display(),
        channels,
        sample_rate,
        bit_depth,
        matrix.num_samples()
    );
    Ok(())
}
