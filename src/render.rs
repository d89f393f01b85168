use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::buffer::SampleMatrix;
use crate::engine::{play_bounds, Playhead, SharedPlayback};
use crate::resampler::{ResampleProgress, Resampler};
use crate::transport::TransportState;

pub struct BlockRenderer {
    shared: Arc<SharedPlayback>,
    device_rate: u32,
    resamplers: Vec<Resampler>, // one per output channel
    seen_discontinuity: u64,
}

impl BlockRenderer {
    pub fn new(shared: Arc<SharedPlayback>, device_rate: u32, out_channels: usize) -> Self {
        let seen_discontinuity = shared.discontinuity.load(Ordering::Acquire);
        Self {
            shared,
            device_rate,
            resamplers: vec![Resampler::new(); out_channels.max(1)],
            seen_discontinuity,
        }
    }

    pub fn device_rate(&self) -> u32 {
        self.device_rate
    }

    pub fn out_channels(&self) -> usize {
        self.resamplers.len()
    }

    /// Fill `frames` samples of every output channel. Outputs beyond the
    /// renderer's channel count stay silent. Runs on the audio thread and
    /// never allocates, locks or logs.
    pub fn produce_block(&mut self, outputs: &mut [&mut [f32]], frames: usize) {
        let frames = outputs
            .iter()
            .map(|o| o.len())
            .min()
            .unwrap_or(0)
            .min(frames);
        for out in outputs.iter_mut() {
            out[..frames].fill(0.0);
        }

        let shared = &self.shared;
        let gen = shared.discontinuity.load(Ordering::Acquire);
        if gen != self.seen_discontinuity {
            self.seen_discontinuity = gen;
            self.resamplers.iter_mut().for_each(Resampler::reset);
        }
        // after the counter, before the state: a jump stores the playhead
        // first, a stop stores the state first
        let loaded = shared.cursor.load_tagged();

        if frames == 0 || shared.state() != TransportState::Playing {
            shared.meter_rms.store(0.0, Ordering::Relaxed);
            return;
        }
        let guard = shared.samples.load();
        let Some(samples) = guard.as_ref() else {
            shared.meter_rms.store(0.0, Ordering::Relaxed);
            return;
        };
        if samples.is_empty() {
            // nothing left to play counts as reaching the region end
            shared.region_end_reached.store(true, Ordering::Release);
            shared.meter_rms.store(0.0, Ordering::Relaxed);
            return;
        }
        let file_rate = shared.sample_rate.load(Ordering::Acquire);
        if file_rate == 0 || self.device_rate == 0 {
            shared.meter_rms.store(0.0, Ordering::Relaxed);
            return;
        }
        let ratio = file_rate as f64 / self.device_rate as f64;
        let (start, end) = play_bounds(
            samples.num_samples(),
            shared.marker_start.load(Ordering::Acquire),
            shared.marker_end.load(Ordering::Acquire),
        );
        let looping = shared.loop_enabled.load(Ordering::Acquire);

        let mut cursor = Playhead::position(loaded);
        let mut produced = 0usize;
        while produced < frames {
            if cursor >= end {
                if looping && end > start {
                    // interpolation history carries across the seam
                    cursor = start;
                    continue;
                }
                shared.region_end_reached.store(true, Ordering::Release);
                break;
            }
            let progress = render_span(
                &mut self.resamplers,
                samples,
                ratio,
                cursor..end,
                outputs,
                produced..frames,
            );
            if progress.consumed == 0 && progress.produced == 0 {
                break;
            }
            cursor += progress.consumed;
            produced += progress.produced;
        }

        let vol = shared.vol.load(Ordering::Relaxed);
        let mut sum_sq = 0.0f32;
        for i in 0..produced {
            let mut frame_sum = 0.0f32;
            for out in outputs.iter_mut() {
                out[i] *= vol;
                frame_sum += out[i];
            }
            let frame_avg = frame_sum / outputs.len() as f32;
            sum_sq += frame_avg * frame_avg;
        }
        let rms = if produced > 0 {
            (sum_sq / produced as f32).sqrt()
        } else {
            0.0
        };
        shared.meter_rms.store(rms, Ordering::Relaxed);

        // any control-side store since the load wins
        shared.cursor.advance(loaded, cursor);
    }
}

fn render_span(
    resamplers: &mut [Resampler],
    samples: &SampleMatrix,
    ratio: f64,
    input: std::ops::Range<usize>,
    outputs: &mut [&mut [f32]],
    span: std::ops::Range<usize>,
) -> ResampleProgress {
    if outputs.is_empty() {
        return ResampleProgress::default();
    }
    if samples.num_channels() == 1 {
        // interpolate once, duplicate into the remaining outputs
        let (first, rest) = outputs.split_at_mut(1);
        let dst = &mut first[0][span.clone()];
        let progress = resamplers[0].process(ratio, &samples.channel(0)[input], dst);
        let written = span.start..span.start + progress.produced;
        for out in rest.iter_mut() {
            out[written.clone()].copy_from_slice(&first[0][written.clone()]);
        }
        return progress;
    }
    let mut progress = ResampleProgress::default();
    let channels = samples
        .num_channels()
        .min(outputs.len())
        .min(resamplers.len());
    for (ci, (out, resampler)) in outputs
        .iter_mut()
        .zip(resamplers.iter_mut())
        .take(channels)
        .enumerate()
    {
        progress = resampler.process(
            ratio,
            &samples.channel(ci)[input.clone()],
            &mut out[span.clone()],
        );
    }
    progress
}
