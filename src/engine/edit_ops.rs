use std::sync::atomic::Ordering;

use crate::buffer::SampleMatrix;
use crate::error::{EditResult, EngineResult};
use crate::region;
use crate::undo::UndoRecord;

impl crate::engine::PlaybackEngine {
    pub fn mute_marked_region(&mut self) -> EngineResult<bool> {
        self.edit_marked_in_place("mute", region::mute)
    }

    pub fn fade_in_marked_region(&mut self) -> EngineResult<bool> {
        self.edit_marked_in_place("fade in", region::fade_in)
    }

    pub fn fade_out_marked_region(&mut self) -> EngineResult<bool> {
        self.edit_marked_in_place("fade out", region::fade_out)
    }

    pub fn gain_marked_region(&mut self, factor: f32) -> EngineResult<bool> {
        self.edit_marked_in_place("gain", |buf, start, len| {
            region::gain(buf, start, len, factor)
        })
    }

    /// Remove the marked region; markers collapse onto its start.
    pub fn delete_marked_region(&mut self) -> EngineResult<bool> {
        let Some((start, len)) = self.marked_span() else {
            return Ok(false);
        };
        let Some(current) = self.snapshot() else {
            return Ok(false);
        };
        let mut next = (*current).clone();
        let before = next.slice(start, len)?;
        region::delete_region(&mut next, start, len)?;
        let after = SampleMatrix::new(next.num_channels(), 0);
        log::debug!("edit: delete {len} samples at {start}");
        self.undo.add_record(UndoRecord::new(before, after, start));
        self.collapse_markers_to(start);
        self.commit_buffer(next);
        Ok(true)
    }

    /// Apply a length-preserving edit to the marked region and record it.
    fn edit_marked_in_place<F>(&mut self, label: &str, op: F) -> EngineResult<bool>
    where
        F: FnOnce(&mut SampleMatrix, usize, usize) -> EditResult<()>,
    {
        let Some((start, len)) = self.marked_span() else {
            return Ok(false);
        };
        let Some(current) = self.snapshot() else {
            return Ok(false);
        };
        let mut next = (*current).clone();
        let before = next.slice(start, len)?;
        op(&mut next, start, len)?;
        let after = next.slice(start, len)?;
        log::debug!("edit: {label} [{start}, {})", start + len);
        self.undo.add_record(UndoRecord::new(before, after, start));
        self.commit_buffer(next);
        Ok(true)
    }

    pub(crate) fn collapse_markers_to(&mut self, pos: usize) {
        self.shared.marker_start.store(pos, Ordering::Release);
        self.shared.marker_end.store(pos, Ordering::Release);
        self.shared.cursor.store(pos);
        self.shared.mark_discontinuity();
    }
}
