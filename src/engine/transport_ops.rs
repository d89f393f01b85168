use std::sync::atomic::Ordering;

use crate::engine::PositionKind;
use crate::events::EditorEvent;
use crate::transport::{self, TransportCommand, TransportState};

impl crate::engine::PlaybackEngine {
    pub fn get_state(&self) -> TransportState {
        self.shared.state()
    }

    pub fn play_requested(&mut self) {
        if self.num_samples() == 0 {
            log::debug!("transport: nothing to play");
            return;
        }
        self.apply_transport(TransportCommand::Play);
    }

    pub fn pause_requested(&mut self) {
        self.apply_transport(TransportCommand::Pause);
    }

    pub fn stop_requested(&mut self) {
        self.apply_transport(TransportCommand::Stop);
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.shared.loop_enabled.store(enabled, Ordering::Release);
    }

    pub fn is_loop_enabled(&self) -> bool {
        self.shared.loop_enabled.load(Ordering::Acquire)
    }

    /// Settle events raised by the renderer. Call periodically from the
    /// control thread; returns true if the transport changed.
    pub fn poll(&mut self) -> bool {
        self.release_retired();
        if !self.shared.region_end_reached.swap(false, Ordering::AcqRel) {
            return false;
        }
        if self.get_state() != TransportState::Playing {
            return false;
        }
        log::debug!("transport: end of region reached");
        self.apply_transport(TransportCommand::RegionEnd);
        true
    }

    fn apply_transport(&mut self, command: TransportCommand) {
        for next in transport::plan(self.get_state(), command) {
            self.enter_state(next);
        }
    }

    fn enter_state(&mut self, next: TransportState) {
        let prev = self.get_state();
        if prev == next {
            return;
        }
        self.shared.state.store(next.as_u8(), Ordering::Release);
        match next {
            TransportState::Starting => {
                // resume from the cursor when it lies inside the region
                let (start, end) = self.play_bounds();
                let cursor = self.position_samples(PositionKind::Cursor);
                if cursor < start || cursor >= end {
                    self.shared.cursor.store(start);
                }
                self.shared.region_end_reached.store(false, Ordering::Release);
                self.shared.mark_discontinuity();
            }
            TransportState::Pausing => {
                let resume = self.position_samples(PositionKind::Cursor);
                log::debug!("transport: paused at sample {resume}");
            }
            TransportState::Stopped => {
                let start = self.position_samples(PositionKind::MarkerStart);
                self.shared.cursor.store(start);
                self.shared.region_end_reached.store(false, Ordering::Release);
                self.shared.mark_discontinuity();
            }
            TransportState::Playing | TransportState::Paused | TransportState::Stopping => {}
        }
        log::debug!("transport: {prev} -> {next}");
        self.emit(EditorEvent::TransportChanged(next));
    }

    /// `[start, end)` the renderer streams: the marked region, or from the
    /// start marker to the end of the track when nothing is marked.
    pub fn play_bounds(&self) -> (usize, usize) {
        play_bounds(
            self.num_samples(),
            self.position_samples(PositionKind::MarkerStart),
            self.position_samples(PositionKind::MarkerEnd),
        )
    }
}

pub(crate) fn play_bounds(len: usize, marker_start: usize, marker_end: usize) -> (usize, usize) {
    let start = marker_start.min(len);
    let end = if marker_end > start {
        marker_end.saturating_add(1).min(len)
    } else {
        len
    };
    (start, end)
}
