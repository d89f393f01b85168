use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use atomic_float::AtomicF32;

use crate::audio_io;
use crate::buffer::SampleMatrix;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{EditorEvent, Listeners};
use crate::render::BlockRenderer;
use crate::transport::TransportState;
use crate::undo::UndoStack;

mod clipboard_ops;
mod edit_ops;
mod history_ops;
mod position_ops;
mod transport_ops;

pub use position_ops::PositionKind;
pub(crate) use transport_ops::play_bounds;

const PLAYHEAD_POS_BITS: u32 = 40;
const PLAYHEAD_POS_MASK: u64 = (1 << PLAYHEAD_POS_BITS) - 1;

/// Playhead sample index tagged with a write generation in the high bits.
///
/// Control-thread stores bump the generation, so a renderer that loaded the
/// word before a stop or seek fails its compare-exchange even when the new
/// position equals the one it loaded.
pub struct Playhead(AtomicU64);

impl Playhead {
    fn new(pos: usize) -> Self {
        Self(AtomicU64::new(pos as u64 & PLAYHEAD_POS_MASK))
    }

    pub fn get(&self) -> usize {
        Self::position(self.load_tagged())
    }

    pub(crate) fn load_tagged(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn position(tagged: u64) -> usize {
        (tagged & PLAYHEAD_POS_MASK) as usize
    }

    /// Control-side write. Always starts a new generation.
    pub(crate) fn store(&self, pos: usize) {
        let pos = pos as u64 & PLAYHEAD_POS_MASK;
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |tagged| {
                let gen = (tagged >> PLAYHEAD_POS_BITS).wrapping_add(1);
                Some((gen << PLAYHEAD_POS_BITS) | pos)
            });
    }

    /// Renderer-side write. Succeeds only if nothing was stored since `loaded`.
    pub(crate) fn advance(&self, loaded: u64, pos: usize) -> bool {
        let next = (loaded & !PLAYHEAD_POS_MASK) | (pos as u64 & PLAYHEAD_POS_MASK);
        self.0
            .compare_exchange(loaded, next, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }
}

/// State shared with the audio thread.
pub struct SharedPlayback {
    pub samples: ArcSwapOption<SampleMatrix>,
    pub sample_rate: AtomicU32,
    pub state: AtomicU8,
    pub cursor: Playhead,
    pub marker_start: AtomicUsize,
    pub marker_end: AtomicUsize,
    pub loop_enabled: AtomicBool,
    /// Raised by the renderer when the playhead runs off the region end.
    pub region_end_reached: AtomicBool,
    /// Bumped whenever the playhead jumps; renderers reset their interpolators.
    pub discontinuity: AtomicU64,
    pub vol: AtomicF32,       // 0.0..=1.0 linear gain
    pub meter_rms: AtomicF32, // last block's output RMS
}

impl SharedPlayback {
    fn new(loop_enabled: bool) -> Self {
        Self {
            samples: ArcSwapOption::from(None),
            sample_rate: AtomicU32::new(0),
            state: AtomicU8::new(TransportState::Stopped.as_u8()),
            cursor: Playhead::new(0),
            marker_start: AtomicUsize::new(0),
            marker_end: AtomicUsize::new(0),
            loop_enabled: AtomicBool::new(loop_enabled),
            region_end_reached: AtomicBool::new(false),
            discontinuity: AtomicU64::new(0),
            vol: AtomicF32::new(1.0),
            meter_rms: AtomicF32::new(0.0),
        }
    }

    pub fn state(&self) -> TransportState {
        TransportState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn mark_discontinuity(&self) {
        self.discontinuity.fetch_add(1, Ordering::AcqRel);
    }
}

pub struct PlaybackEngine {
    shared: Arc<SharedPlayback>,
    config: EngineConfig,
    undo: UndoStack,
    clipboard: Option<SampleMatrix>,
    listeners: Listeners,
    // replaced snapshots a renderer guard may still hold; freed here, never
    // on the audio thread
    retired: Vec<Arc<SampleMatrix>>,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PlaybackEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(SharedPlayback::new(config.loop_enabled)),
            undo: UndoStack::new(config.max_undo_times),
            clipboard: None,
            listeners: Listeners::new(),
            retired: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn shared(&self) -> Arc<SharedPlayback> {
        Arc::clone(&self.shared)
    }

    /// Real-time half for an output running at `device_rate` with `out_channels`.
    pub fn renderer(&self, device_rate: u32, out_channels: usize) -> BlockRenderer {
        BlockRenderer::new(self.shared(), device_rate, out_channels)
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// Current buffer snapshot, if one is loaded.
    pub fn snapshot(&self) -> Option<Arc<SampleMatrix>> {
        self.shared.samples.load_full()
    }

    pub fn has_buffer(&self) -> bool {
        self.shared.samples.load().is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate.load(Ordering::Acquire)
    }

    pub fn num_channels(&self) -> usize {
        self.shared
            .samples
            .load()
            .as_ref()
            .map(|s| s.num_channels())
            .unwrap_or(0)
    }

    pub fn num_samples(&self) -> usize {
        self.shared
            .samples
            .load()
            .as_ref()
            .map(|s| s.num_samples())
            .unwrap_or(0)
    }

    pub fn set_volume(&self, v: f32) {
        self.shared.vol.store(v.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        self.shared.vol.load(Ordering::Relaxed)
    }

    /// RMS of the most recently rendered block.
    pub fn output_level(&self) -> f32 {
        self.shared.meter_rms.load(Ordering::Relaxed)
    }

    /// Replace the buffer: stops the transport, clears history, selects the
    /// whole track and parks the cursor at 0.
    pub fn load_buffer(&mut self, matrix: SampleMatrix, sample_rate: u32) {
        self.stop_requested();
        self.undo.reset();
        let len = matrix.num_samples();
        log::info!(
            "load buffer: {} ch, {} frames @ {} Hz",
            matrix.num_channels(),
            len,
            sample_rate
        );
        self.shared.sample_rate.store(sample_rate, Ordering::Release);
        self.shared.cursor.store(0);
        self.shared.marker_start.store(0, Ordering::Release);
        self.shared.marker_end.store(len, Ordering::Release);
        self.shared.region_end_reached.store(false, Ordering::Release);
        self.publish_buffer(Arc::new(matrix));
        self.shared.mark_discontinuity();
        self.emit_buffer_changed();
    }

    /// Decode `path` and load it. On failure the current buffer is untouched.
    pub fn load_file(&mut self, path: &Path) -> EngineResult<()> {
        let load_failed = |source: anyhow::Error| EngineError::LoadFailed {
            path: path.to_path_buf(),
            source,
        };
        let decoded = audio_io::decode_audio_multi(path).map_err(load_failed)?;
        let (matrix, sample_rate) = decoded.into_matrix().map_err(load_failed)?;
        self.load_buffer(matrix, sample_rate);
        Ok(())
    }

    /// Encode the current buffer at the configured bit depth (24-bit by default).
    pub fn save_file(&self, path: &Path) -> EngineResult<()> {
        let snapshot = self.snapshot().ok_or(EngineError::NoBuffer)?;
        audio_io::encode_wav(
            &snapshot,
            self.sample_rate(),
            self.config.encode_bit_depth,
            path,
        )
        .map_err(|source| EngineError::SaveFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of replaced snapshots still waiting for a renderer to let go.
    pub fn retired_snapshots(&self) -> usize {
        self.retired.len()
    }

    fn publish_buffer(&mut self, next: Arc<SampleMatrix>) {
        if let Some(prev) = self.shared.samples.swap(Some(next)) {
            self.retired.push(prev);
        }
        self.release_retired();
    }

    /// Drop replaced snapshots nobody else references. The swap settles any
    /// outstanding guard into a real reference, so a count of one means the
    /// audio thread is done with it.
    pub(crate) fn release_retired(&mut self) {
        self.retired.retain(|snapshot| Arc::strong_count(snapshot) > 1);
    }

    /// Publish an edited buffer, re-clamp positions and notify observers.
    pub(crate) fn commit_buffer(&mut self, next: SampleMatrix) {
        let resized = next.num_samples() != self.num_samples();
        self.publish_buffer(Arc::new(next));
        self.bound_positions(resized);
        self.emit_buffer_changed();
    }

    pub(crate) fn emit(&mut self, event: EditorEvent) {
        self.listeners.emit(&event);
    }

    fn emit_buffer_changed(&mut self) {
        let (num_channels, num_samples) = (self.num_channels(), self.num_samples());
        self.emit(EditorEvent::AudioBufferChanged {
            num_channels,
            num_samples,
        });
    }
}
