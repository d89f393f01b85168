const HISTORY: usize = 4;

/// How far a [`Resampler::process`] call got.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResampleProgress {
    /// Input samples pulled into the history.
    pub consumed: usize,
    /// Output samples written.
    pub produced: usize,
}

/// 4-point Catmull-Rom interpolator for one channel. State carries across
/// calls, so any block split yields the same output.
#[derive(Clone, Debug)]
pub struct Resampler {
    // newest sample at index 0
    history: [f32; HISTORY],
    phase: f64,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Resampler {
    pub fn new() -> Self {
        Self {
            history: [0.0; HISTORY],
            phase: 1.0,
        }
    }

    /// Forget history and phase, as if starting from silence.
    pub fn reset(&mut self) {
        self.history = [0.0; HISTORY];
        self.phase = 1.0;
    }

    /// Fill `output` from `input`, advancing `ratio` input samples per output
    /// sample (`ratio = input_rate / output_rate`).
    ///
    /// Returns early only when the next output needs an input sample that
    /// `input` does not have; the caller resumes with the unconsumed tail.
    pub fn process(&mut self, ratio: f64, input: &[f32], output: &mut [f32]) -> ResampleProgress {
        if ratio == 1.0 {
            return self.copy_through(input, output);
        }
        if !(ratio.is_finite() && ratio > 0.0) {
            return ResampleProgress::default();
        }
        let mut pos = self.phase;
        let mut consumed = 0usize;
        let mut produced = 0usize;
        'out: for out in output.iter_mut() {
            while pos >= 1.0 {
                let Some(&next) = input.get(consumed) else {
                    break 'out;
                };
                self.push(next);
                consumed += 1;
                pos -= 1.0;
            }
            *out = catmull_rom(&self.history, pos as f32);
            produced += 1;
            pos += ratio;
        }
        self.phase = pos;
        ResampleProgress { consumed, produced }
    }

    fn copy_through(&mut self, input: &[f32], output: &mut [f32]) -> ResampleProgress {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        for &v in &input[n.saturating_sub(HISTORY)..n] {
            self.push(v);
        }
        ResampleProgress {
            consumed: n,
            produced: n,
        }
    }

    fn push(&mut self, sample: f32) {
        self.history.copy_within(0..HISTORY - 1, 1);
        self.history[0] = sample;
    }
}

/// Interpolate between `h[2]` and `h[1]` at `offset` in [0, 1).
#[inline]
fn catmull_rom(h: &[f32; HISTORY], offset: f32) -> f32 {
    let y0 = h[3];
    let y1 = h[2];
    let y2 = h[1];
    let y3 = h[0];
    let half_y0 = 0.5 * y0;
    let half_y3 = 0.5 * y3;
    y1 + offset
        * ((0.5 * y2 - half_y0)
            + offset
                * (((y0 + 2.0 * y2) - (half_y3 + 2.5 * y1))
                    + offset * ((half_y3 + 1.5 * y1) - (half_y0 + 1.5 * y2))))
}
