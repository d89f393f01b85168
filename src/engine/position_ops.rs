use std::sync::atomic::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Cursor,
    MarkerStart,
    MarkerEnd,
}

impl crate::engine::PlaybackEngine {
    pub fn position_samples(&self, kind: PositionKind) -> usize {
        match kind {
            PositionKind::Cursor => self.shared.cursor.get(),
            PositionKind::MarkerStart => self.shared.marker_start.load(Ordering::Acquire),
            PositionKind::MarkerEnd => self.shared.marker_end.load(Ordering::Acquire),
        }
    }

    /// Position in seconds at the buffer's own sample rate.
    pub fn get_position(&self, kind: PositionKind) -> f64 {
        let sr = self.sample_rate();
        if sr == 0 {
            return 0.0;
        }
        self.position_samples(kind) as f64 / sr as f64
    }

    pub fn set_position(&mut self, kind: PositionKind, seconds: f64) {
        let sr = self.sample_rate() as f64;
        let samples = if seconds.is_finite() && seconds > 0.0 {
            (seconds * sr).round() as usize
        } else {
            0
        };
        self.set_position_samples(kind, samples);
    }

    /// Clamp into `[0, N]`. Moving one marker past the other drags the other
    /// along so that `marker_start <= marker_end` always holds.
    pub fn set_position_samples(&mut self, kind: PositionKind, samples: usize) {
        let len = self.num_samples();
        let pos = samples.min(len);
        match kind {
            PositionKind::Cursor => {
                self.shared.cursor.store(pos);
                self.shared.mark_discontinuity();
            }
            PositionKind::MarkerStart => {
                self.shared.marker_start.store(pos, Ordering::Release);
                if self.shared.marker_end.load(Ordering::Acquire) < pos {
                    self.shared.marker_end.store(pos, Ordering::Release);
                }
            }
            PositionKind::MarkerEnd => {
                self.shared.marker_end.store(pos, Ordering::Release);
                if self.shared.marker_start.load(Ordering::Acquire) > pos {
                    self.shared.marker_start.store(pos, Ordering::Release);
                }
            }
        }
        log::debug!("position {kind:?} -> {pos}");
    }

    /// Select `[start, end]` (inclusive) and park the cursor on `start`.
    pub fn select(&mut self, start_secs: f64, end_secs: f64) {
        let (s, e) = if start_secs <= end_secs {
            (start_secs, end_secs)
        } else {
            (end_secs, start_secs)
        };
        self.set_position(PositionKind::MarkerStart, s);
        self.set_position(PositionKind::MarkerEnd, e);
        self.set_position(PositionKind::Cursor, s);
    }

    pub fn get_length_seconds(&self) -> f64 {
        let sr = self.sample_rate();
        if sr == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / sr as f64
    }

    /// Marked region as `(start, len)`.
    ///
    /// Markers are inclusive, so `[2, 6]` covers five samples; a marker end at
    /// `N` after a full-track selection covers through the last sample.
    pub fn marked_span(&self) -> Option<(usize, usize)> {
        let len = self.num_samples();
        if len == 0 {
            return None;
        }
        let start = self.position_samples(PositionKind::MarkerStart).min(len);
        let end_excl = self
            .position_samples(PositionKind::MarkerEnd)
            .saturating_add(1)
            .min(len);
        if end_excl <= start {
            return None;
        }
        Some((start, end_excl - start))
    }

    /// Re-clamp cursor and markers into `[0, N]` after an edit. A resized
    /// buffer also restores the cursor so a renderer's in-flight advance,
    /// computed against the old layout, is discarded.
    pub(crate) fn bound_positions(&mut self, resized: bool) {
        let len = self.num_samples();
        let start = self.position_samples(PositionKind::MarkerStart).min(len);
        let end = self.position_samples(PositionKind::MarkerEnd).min(len).max(start);
        let cursor = self.position_samples(PositionKind::Cursor).min(len);
        self.shared.marker_start.store(start, Ordering::Release);
        self.shared.marker_end.store(end, Ordering::Release);
        if resized || cursor != self.position_samples(PositionKind::Cursor) {
            self.shared.cursor.store(cursor);
            self.shared.mark_discontinuity();
        }
    }
}
