use crate::error::{EditError, EditResult};

/// Owned multichannel sample buffer, channel-major.
///
/// Every channel always holds exactly `num_samples()` samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleMatrix {
    channels: Vec<Vec<f32>>, // per-channel samples, nominally in [-1, 1]
}

impl SampleMatrix {
    /// Silent matrix of `channels` x `len`.
    pub fn new(channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; channels],
        }
    }

    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            channels: vec![mono],
        }
    }

    pub fn from_channels(channels: Vec<Vec<f32>>) -> EditResult<Self> {
        let expected = channels.first().map(|c| c.len()).unwrap_or(0);
        if let Some((channel, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != expected)
        {
            return Err(EditError::RaggedChannels {
                expected,
                channel,
                found: ch.len(),
            });
        }
        Ok(Self { channels })
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Vec<f32>> {
        self.channels.iter_mut()
    }

    /// Resize every channel to `len`, keeping the overlapping prefix and
    /// zero-filling any new tail.
    pub fn resize(&mut self, len: usize) {
        for ch in self.channels.iter_mut() {
            ch.resize(len, 0.0);
        }
    }

    /// Copy of `[start, start + len)` across all channels.
    pub fn slice(&self, start: usize, len: usize) -> EditResult<Self> {
        check_span(self, start, len)?;
        Ok(Self {
            channels: self
                .channels
                .iter()
                .map(|ch| ch[start..start + len].to_vec())
                .collect(),
        })
    }

    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / sample_rate as f64
    }
}

pub(crate) fn check_span(buf: &SampleMatrix, start: usize, len: usize) -> EditResult<()> {
    let available = buf.num_samples();
    match start.checked_add(len) {
        Some(end) if end <= available => Ok(()),
        _ => Err(EditError::InvalidRange {
            start,
            len,
            available,
        }),
    }
}
