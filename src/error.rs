use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by sample-matrix edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Span runs past the end of the buffer
    #[error("invalid range: start={start} len={len} available={available}")]
    InvalidRange {
        start: usize,
        len: usize,
        available: usize,
    },

    /// Channels of different lengths were handed to a matrix constructor
    #[error("channels have mismatched lengths (expected {expected}, channel {channel} has {found})")]
    RaggedChannels {
        expected: usize,
        channel: usize,
        found: usize,
    },
}

/// Errors raised by the playback engine's control surface
#[derive(Error, Debug)]
pub enum EngineError {
    /// The codec could not produce a buffer; the previous buffer is kept
    #[error("failed to load {}: {source:#}", path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The codec could not write the buffer
    #[error("failed to save {}: {source:#}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The command needs a loaded buffer
    #[error("no audio buffer loaded")]
    NoBuffer,

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type EditResult<T> = Result<T, EditError>;
pub type EngineResult<T> = Result<T, EngineError>;
