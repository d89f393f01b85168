use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kooledit::audio_io;
use kooledit::device::OutputDevice;
use kooledit::spectrogram::{Spectrogram, MAX_FFT_ORDER, MIN_FFT_ORDER};
use kooledit::{EngineConfig, PlaybackEngine, PositionKind, TransportState};

#[derive(Parser)]
#[command(name = "kooledit", version, about = "Region editor for audio files")]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(short, long, global = true, default_value = "kooledit.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print format details of an audio file
    Info { file: PathBuf },
    /// Apply a sequence of operations and save the result as WAV
    Edit {
        input: PathBuf,
        output: PathBuf,
        /// select:S-E | cursor:S | mute | fade-in | fade-out | gain:F |
        /// delete | copy | cut | paste | insert | undo | redo
        #[arg(required = true)]
        ops: Vec<EditOp>,
    },
    /// Summarise the spectrogram of channel 0
    Spectrogram {
        file: PathBuf,
        /// FFT size is 2^order (overrides the config)
        #[arg(long)]
        order: Option<u32>,
    },
    /// Play through the default output device
    Play {
        file: PathBuf,
        #[arg(long)]
        start: Option<f64>,
        #[arg(long)]
        end: Option<f64>,
        #[arg(long = "loop")]
        looping: bool,
        /// Output volume 0..1
        #[arg(long, default_value_t = 1.0)]
        volume: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum EditOp {
    Select(f64, f64),
    Cursor(f64),
    Mute,
    FadeIn,
    FadeOut,
    Gain(f32),
    Delete,
    Copy,
    Cut,
    Paste,
    Insert,
    Undo,
    Redo,
}

impl FromStr for EditOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (s, None),
        };
        let secs = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad time '{v}' in '{s}': {e}"))
        };
        let op = match (name.to_ascii_lowercase().as_str(), arg) {
            ("select", Some(a)) => {
                let (start, end) = a
                    .split_once('-')
                    .ok_or_else(|| format!("expected select:START-END, got '{s}'"))?;
                EditOp::Select(secs(start)?, secs(end)?)
            }
            ("cursor", Some(a)) => EditOp::Cursor(secs(a)?),
            ("gain", Some(a)) => EditOp::Gain(
                a.trim()
                    .parse::<f32>()
                    .map_err(|e| format!("bad gain '{a}': {e}"))?,
            ),
            ("mute", None) => EditOp::Mute,
            ("fade-in", None) => EditOp::FadeIn,
            ("fade-out", None) => EditOp::FadeOut,
            ("delete", None) => EditOp::Delete,
            ("copy", None) => EditOp::Copy,
            ("cut", None) => EditOp::Cut,
            ("paste", None) => EditOp::Paste,
            ("insert", None) => EditOp::Insert,
            ("undo", None) => EditOp::Undo,
            ("redo", None) => EditOp::Redo,
            _ => return Err(format!("unknown operation '{s}'")),
        };
        Ok(op)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Info { file } => print_info(&file),
        Commands::Edit { input, output, ops } => run_edit(config, &input, &output, &ops),
        Commands::Spectrogram { file, order } => run_spectrogram(config, &file, order),
        Commands::Play {
            file,
            start,
            end,
            looping,
            volume,
        } => run_play(config, &file, start, end, looping, volume),
    }
}

fn print_info(path: &Path) -> Result<()> {
    let info = audio_io::read_audio_info(path)?;
    println!("{}", path.display());
    println!("  channels:    {}", info.channels);
    println!("  sample rate: {} Hz", info.sample_rate);
    if info.bits_per_sample > 0 {
        println!("  bit depth:   {}", info.bits_per_sample);
    }
    match info.duration_secs {
        Some(secs) => println!("  duration:    {secs:.3} s"),
        None => println!("  duration:    unknown"),
    }
    Ok(())
}

fn load_engine(config: EngineConfig, path: &Path) -> Result<PlaybackEngine> {
    let mut engine = PlaybackEngine::new(config);
    engine.load_file(path)?;
    Ok(engine)
}

fn run_edit(config: EngineConfig, input: &Path, output: &Path, ops: &[EditOp]) -> Result<()> {
    let mut engine = load_engine(config, input)?;
    for op in ops {
        let applied = match *op {
            EditOp::Select(start, end) => {
                engine.select(start, end);
                true
            }
            EditOp::Cursor(secs) => {
                engine.set_position(PositionKind::Cursor, secs);
                true
            }
            EditOp::Mute => engine.mute_marked_region()?,
            EditOp::FadeIn => engine.fade_in_marked_region()?,
            EditOp::FadeOut => engine.fade_out_marked_region()?,
            EditOp::Gain(factor) => engine.gain_marked_region(factor)?,
            EditOp::Delete => engine.delete_marked_region()?,
            EditOp::Copy => engine.copy_marked_region()?,
            EditOp::Cut => engine.cut_marked_region()?,
            EditOp::Paste => engine.paste_from_cursor()?,
            EditOp::Insert => engine.insert_from_cursor()?,
            EditOp::Undo => engine.undo()?,
            EditOp::Redo => engine.redo()?,
        };
        if !applied {
            log::warn!("{op:?}: nothing to do");
        }
    }
    engine
        .save_file(output)
        .with_context(|| format!("save {}", output.display()))?;
    println!(
        "{} -> {} ({:.3} s, {} ch)",
        input.display(),
        output.display(),
        engine.get_length_seconds(),
        engine.num_channels()
    );
    Ok(())
}

fn run_spectrogram(config: EngineConfig, path: &Path, order: Option<u32>) -> Result<()> {
    let order = order.unwrap_or(config.spectrogram.fft_order);
    if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&order) {
        anyhow::bail!("FFT order must be within {MIN_FFT_ORDER}..={MAX_FFT_ORDER} (got {order})");
    }
    let engine = load_engine(config, path)?;
    let snapshot = engine.snapshot().context("no buffer loaded")?;
    let sg = Spectrogram::compute(&snapshot, order);
    println!(
        "{}: {} rows x {} bins (fft {})",
        path.display(),
        sg.rows,
        sg.bins,
        sg.fft_size
    );
    let sr = engine.sample_rate();
    let step = (sg.rows / 16).max(1);
    for row in (0..sg.rows).step_by(step) {
        if let Some(bin) = sg.peak_bin(row) {
            let t = (row * sg.fft_size) as f64 / sr.max(1) as f64;
            println!(
                "  {t:8.3} s  peak {:8.1} Hz",
                sg.bin_frequency(bin, sr)
            );
        }
    }
    Ok(())
}

fn run_play(
    config: EngineConfig,
    path: &Path,
    start: Option<f64>,
    end: Option<f64>,
    looping: bool,
    volume: f32,
) -> Result<()> {
    let device_config = config.device.clone();
    let block_size = config.block_size;
    let mut engine = load_engine(config, path)?;
    if start.is_some() || end.is_some() {
        let length = engine.get_length_seconds();
        engine.select(start.unwrap_or(0.0), end.unwrap_or(length));
    }
    engine.set_loop_enabled(looping || engine.config().loop_enabled);
    engine.set_volume(volume);

    let device = OutputDevice::open(&device_config, block_size, |rate, channels| {
        engine.renderer(rate, channels)
    })?;
    log::info!(
        "playing {} at device rate {} Hz",
        path.display(),
        device.sample_rate()
    );
    engine.play_requested();
    while engine.get_state() != TransportState::Stopped {
        std::thread::sleep(Duration::from_millis(20));
        engine.poll();
    }
    Ok(())
}
