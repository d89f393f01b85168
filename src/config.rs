use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::spectrogram::{MAX_FFT_ORDER, MIN_FFT_ORDER};
use crate::undo::DEFAULT_MAX_UNDO_TIMES;

pub const DEFAULT_BLOCK_SIZE: usize = 512;
pub const DEFAULT_ENCODE_BIT_DEPTH: u16 = 24;
pub const DEFAULT_FFT_ORDER: u32 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_undo_times: usize,
    pub loop_enabled: bool,
    /// Frames per device callback chunk.
    pub block_size: usize,
    pub encode_bit_depth: u16,
    pub device: DeviceConfig,
    pub spectrogram: SpectrogramConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_times: DEFAULT_MAX_UNDO_TIMES,
            loop_enabled: false,
            block_size: DEFAULT_BLOCK_SIZE,
            encode_bit_depth: DEFAULT_ENCODE_BIT_DEPTH,
            device: DeviceConfig::default(),
            spectrogram: SpectrogramConfig::default(),
        }
    }
}

/// Overrides for the default output device; `None` keeps the device's own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    pub fft_order: u32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            fft_order: DEFAULT_FFT_ORDER,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text).context("parse engine config")?;
        cfg.validated()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize engine config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("load config: {}", path.display()))
    }

    /// Defaults when `path` does not exist; errors only on unreadable or invalid files.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validated(self) -> Result<Self> {
        if self.block_size == 0 {
            anyhow::bail!("block_size must be > 0");
        }
        if !matches!(self.encode_bit_depth, 16 | 24 | 32) {
            anyhow::bail!(
                "encode_bit_depth must be 16, 24 or 32 (got {})",
                self.encode_bit_depth
            );
        }
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&self.spectrogram.fft_order) {
            anyhow::bail!(
                "spectrogram.fft_order must be within {MIN_FFT_ORDER}..={MAX_FFT_ORDER} (got {})",
                self.spectrogram.fft_order
            );
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let cfg = EngineConfig::from_toml_str(
            "max_undo_times = 12\n[device]\nsample_rate = 48000\n",
        )
        .expect("parse");
        assert_eq!(cfg.max_undo_times, 12);
        assert_eq!(cfg.device.sample_rate, Some(48_000));
        assert_eq!(cfg.device.channels, None);
        assert_eq!(cfg.encode_bit_depth, 24);
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn rejects_bad_bit_depth() {
        let err = EngineConfig::from_toml_str("encode_bit_depth = 20").unwrap_err();
        assert!(format!("{err:#}").contains("encode_bit_depth"));
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("kooledit_config_that_does_not_exist.toml");
        let cfg = EngineConfig::load_or_default(&path).expect("defaults");
        assert_eq!(cfg, EngineConfig::default());
    }
}
