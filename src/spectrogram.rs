use rustfft::{num_complex::Complex, FftPlanner};

use crate::buffer::SampleMatrix;

pub const MIN_FFT_ORDER: u32 = 4;
pub const MAX_FFT_ORDER: u32 = 16;

/// Magnitude spectra of consecutive, non-overlapping blocks of channel 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrogram {
    pub fft_size: usize,
    pub rows: usize,
    pub bins: usize,
    pub values: Vec<f32>, // rows * bins, row-major
}

impl Spectrogram {
    /// One row per complete `2^fft_order` block; a trailing partial block is
    /// dropped. Rows hold `fft_size / 2 + 1` linear magnitudes. `fft_order`
    /// is clamped to `MIN_FFT_ORDER..=MAX_FFT_ORDER`.
    pub fn compute(buf: &SampleMatrix, fft_order: u32) -> Self {
        let fft_size = 1usize << fft_order.clamp(MIN_FFT_ORDER, MAX_FFT_ORDER);
        let bins = fft_size / 2 + 1;
        let Some(mono) = (buf.num_channels() > 0).then(|| buf.channel(0)) else {
            return Self {
                fft_size,
                rows: 0,
                bins,
                values: Vec::new(),
            };
        };
        let rows = mono.len() / fft_size;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; fft_size];
        let mut values = Vec::with_capacity(rows * bins);
        for block in mono.chunks_exact(fft_size) {
            for (dst, &s) in buffer.iter_mut().zip(block) {
                *dst = Complex { re: s, im: 0.0 };
            }
            fft.process(&mut buffer);
            values.extend(buffer[..bins].iter().map(|c| c.norm()));
        }
        Self {
            fft_size,
            rows,
            bins,
            values,
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        Some(&self.values[row * self.bins..(row + 1) * self.bins])
    }

    /// Centre frequency of `bin` at `sample_rate`.
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f32 {
        if self.fft_size == 0 {
            return 0.0;
        }
        bin as f32 * sample_rate as f32 / self.fft_size as f32
    }

    /// Loudest bin of a row.
    pub fn peak_bin(&self, row: usize) -> Option<usize> {
        let row = self.row(row)?;
        row.iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}
