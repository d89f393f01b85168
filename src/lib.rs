pub mod audio_io;
pub mod buffer;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod events;
pub mod region;
pub mod render;
pub mod resampler;
pub mod spectrogram;
pub mod transport;
pub mod undo;

pub use buffer::SampleMatrix;
pub use config::EngineConfig;
pub use engine::{PlaybackEngine, PositionKind, SharedPlayback};
pub use error::{EditError, EngineError};
pub use events::{EditorEvent, EventChannel, ListenerId};
pub use render::BlockRenderer;
pub use transport::{TransportCommand, TransportState};
pub use undo::{UndoMode, UndoRecord, UndoStack};
