use crate::buffer::SampleMatrix;
use crate::engine::PositionKind;
use crate::error::EngineResult;
use crate::events::EditorEvent;
use crate::region;
use crate::undo::UndoRecord;

impl crate::engine::PlaybackEngine {
    pub fn clipboard(&self) -> Option<&SampleMatrix> {
        self.clipboard.as_ref()
    }

    pub fn is_paste_enabled(&self) -> bool {
        self.clipboard
            .as_ref()
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    pub fn clear_clipboard(&mut self) {
        if self.clipboard.take().is_some() {
            self.emit(EditorEvent::ClipboardChanged { num_samples: 0 });
        }
    }

    pub fn copy_marked_region(&mut self) -> EngineResult<bool> {
        let Some((start, len)) = self.marked_span() else {
            return Ok(false);
        };
        let Some(current) = self.snapshot() else {
            return Ok(false);
        };
        let copied = current.slice(start, len)?;
        log::debug!("clipboard: copied {len} samples at {start}");
        self.clipboard = Some(copied);
        self.emit(EditorEvent::ClipboardChanged { num_samples: len });
        Ok(true)
    }

    /// Copy, then delete the marked region as one undoable edit.
    pub fn cut_marked_region(&mut self) -> EngineResult<bool> {
        if !self.copy_marked_region()? {
            return Ok(false);
        }
        self.delete_marked_region()
    }

    /// Overwrite from the cursor with the clipboard, growing the buffer when
    /// the clipboard runs past the end.
    pub fn paste_from_cursor(&mut self) -> EngineResult<bool> {
        if !self.is_paste_enabled() {
            return Ok(false);
        }
        let (Some(clip), Some(current)) = (self.clipboard.clone(), self.snapshot()) else {
            return Ok(false);
        };
        let at = self.position_samples(PositionKind::Cursor).min(current.num_samples());
        let clip_len = clip.num_samples();
        let overwritten = clip_len.min(current.num_samples() - at);
        let mut next = (*current).clone();
        let before = next.slice(at, overwritten)?;
        region::overwrite_region(&mut next, &clip, at)?;
        let after = next.slice(at, clip_len)?;
        log::debug!("edit: paste {clip_len} samples at {at}");
        self.undo.add_record(UndoRecord::new(before, after, at));
        self.commit_buffer(next);
        Ok(true)
    }

    /// Insert the clipboard at the cursor, shifting the rest of the track right.
    pub fn insert_from_cursor(&mut self) -> EngineResult<bool> {
        if !self.is_paste_enabled() {
            return Ok(false);
        }
        let (Some(clip), Some(current)) = (self.clipboard.clone(), self.snapshot()) else {
            return Ok(false);
        };
        let at = self.position_samples(PositionKind::Cursor).min(current.num_samples());
        let clip_len = clip.num_samples();
        let mut next = (*current).clone();
        region::insert_region(&mut next, &clip, at)?;
        let before = SampleMatrix::new(next.num_channels(), 0);
        let after = next.slice(at, clip_len)?;
        log::debug!("edit: insert {clip_len} samples at {at}");
        self.undo.add_record(UndoRecord::new(before, after, at));
        self.commit_buffer(next);
        Ok(true)
    }
}
