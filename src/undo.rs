use std::collections::VecDeque;

use crate::buffer::SampleMatrix;
use crate::error::EditResult;
use crate::region;

pub const DEFAULT_MAX_UNDO_TIMES: usize = 5;

/// One user edit: the span's content before and after, and where it starts.
#[derive(Clone, Debug)]
pub struct UndoRecord {
    before: SampleMatrix,
    after: SampleMatrix,
    start_channel: usize,
    start_sample: usize,
}

impl UndoRecord {
    pub fn new(before: SampleMatrix, after: SampleMatrix, start_sample: usize) -> Self {
        Self {
            before,
            after,
            start_channel: 0,
            start_sample,
        }
    }

    pub fn before(&self) -> &SampleMatrix {
        &self.before
    }

    pub fn after(&self) -> &SampleMatrix {
        &self.after
    }

    pub fn start_channel(&self) -> usize {
        self.start_channel
    }

    pub fn start_sample(&self) -> usize {
        self.start_sample
    }

    fn approx_bytes(&self) -> usize {
        let samples = self.before.num_samples() * self.before.num_channels()
            + self.after.num_samples() * self.after.num_channels();
        samples * std::mem::size_of::<f32>()
    }
}

/// Direction of the most recent history navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoMode {
    /// Last step was an undo: the buffer holds the before-state of `stack_pos`.
    Undo,
    /// Last step was a redo or a fresh edit: the buffer holds the after-state.
    Redo,
}

#[derive(Debug)]
pub struct UndoStack {
    records: VecDeque<UndoRecord>,
    stack_pos: Option<usize>,
    mode: UndoMode,
    max_undo_times: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_TIMES)
    }
}

impl UndoStack {
    pub fn new(max_undo_times: usize) -> Self {
        Self {
            records: VecDeque::new(),
            stack_pos: None,
            mode: UndoMode::Redo,
            max_undo_times,
        }
    }

    pub fn max_undo_times(&self) -> usize {
        self.max_undo_times
    }

    /// Change the bound; existing history beyond it is evicted oldest first.
    pub fn set_max_undo_times(&mut self, max_undo_times: usize) {
        self.max_undo_times = max_undo_times;
        while self.records.len() > max_undo_times {
            self.evict_oldest();
        }
    }

    pub fn add_record(&mut self, record: UndoRecord) {
        if self.max_undo_times == 0 {
            return;
        }
        if let Some(pos) = self.stack_pos {
            // In undo mode the record at `pos` has been undone, so it goes too.
            let keep = match self.mode {
                UndoMode::Undo => pos,
                UndoMode::Redo => pos + 1,
            };
            self.records.truncate(keep);
            self.stack_pos = keep.checked_sub(1);
        }
        while self.records.len() >= self.max_undo_times {
            self.evict_oldest();
        }
        log::debug!(
            "undo: push record start={} before={} after={} (~{} bytes)",
            record.start_sample,
            record.before.num_samples(),
            record.after.num_samples(),
            record.approx_bytes()
        );
        self.records.push_back(record);
        self.mode = UndoMode::Redo;
        self.stack_pos = Some(self.records.len() - 1);
    }

    /// Step one edit back. Silent no-op when nothing can be undone.
    pub fn undo(&mut self, buffer: &mut SampleMatrix) -> EditResult<bool> {
        if !self.is_undo_enabled() {
            return Ok(false);
        }
        let Some(mut pos) = self.stack_pos else {
            return Ok(false);
        };
        if self.mode == UndoMode::Undo {
            pos -= 1;
        }
        let record = &self.records[pos];
        region::replace_region(
            buffer,
            &record.before,
            record.start_sample,
            record.after.num_samples(),
        )?;
        self.stack_pos = Some(pos);
        self.mode = UndoMode::Undo;
        Ok(true)
    }

    /// Step one edit forward. Silent no-op when nothing can be redone.
    pub fn redo(&mut self, buffer: &mut SampleMatrix) -> EditResult<bool> {
        if !self.is_redo_enabled() {
            return Ok(false);
        }
        let Some(mut pos) = self.stack_pos else {
            return Ok(false);
        };
        if self.mode == UndoMode::Redo {
            pos += 1;
        }
        let record = &self.records[pos];
        region::replace_region(
            buffer,
            &record.after,
            record.start_sample,
            record.before.num_samples(),
        )?;
        self.stack_pos = Some(pos);
        self.mode = UndoMode::Redo;
        Ok(true)
    }

    pub fn is_undo_enabled(&self) -> bool {
        match (self.stack_pos, self.mode) {
            (None, _) => false,
            (Some(_), UndoMode::Redo) => true,
            (Some(pos), UndoMode::Undo) => pos > 0,
        }
    }

    pub fn is_redo_enabled(&self) -> bool {
        match (self.stack_pos, self.mode) {
            (None, _) => false,
            (Some(_), UndoMode::Undo) => true,
            (Some(pos), UndoMode::Redo) => pos + 1 < self.records.len(),
        }
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.stack_pos = None;
        self.mode = UndoMode::Redo;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stack_pos(&self) -> Option<usize> {
        self.stack_pos
    }

    pub fn mode(&self) -> UndoMode {
        self.mode
    }

    fn evict_oldest(&mut self) {
        if self.records.pop_front().is_some() {
            self.stack_pos = self.stack_pos.and_then(|p| p.checked_sub(1));
        }
    }
}
