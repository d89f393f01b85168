use crate::error::EngineResult;
use crate::undo::UndoMode;

impl crate::engine::PlaybackEngine {
    pub fn is_undo_enabled(&self) -> bool {
        self.undo.is_undo_enabled()
    }

    pub fn is_redo_enabled(&self) -> bool {
        self.undo.is_redo_enabled()
    }

    pub fn undo_mode(&self) -> UndoMode {
        self.undo.mode()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn set_max_undo_times(&mut self, max_undo_times: usize) {
        self.undo.set_max_undo_times(max_undo_times);
        self.config.max_undo_times = max_undo_times;
    }

    /// Revert the most recent edit. No-op when there is nothing to undo.
    pub fn undo(&mut self) -> EngineResult<bool> {
        if !self.undo.is_undo_enabled() {
            return Ok(false);
        }
        let Some(current) = self.snapshot() else {
            return Ok(false);
        };
        let mut next = (*current).clone();
        if !self.undo.undo(&mut next)? {
            return Ok(false);
        }
        log::debug!("history: undo -> pos {:?}", self.undo.stack_pos());
        self.commit_buffer(next);
        Ok(true)
    }

    /// Re-apply the most recently undone edit. No-op when there is nothing to redo.
    pub fn redo(&mut self) -> EngineResult<bool> {
        if !self.undo.is_redo_enabled() {
            return Ok(false);
        }
        let Some(current) = self.snapshot() else {
            return Ok(false);
        };
        let mut next = (*current).clone();
        if !self.undo.redo(&mut next)? {
            return Ok(false);
        }
        log::debug!("history: redo -> pos {:?}", self.undo.stack_pos());
        self.commit_buffer(next);
        Ok(true)
    }
}
