//! # pcm-stream-core
//!
//! Device-agnostic PCM streaming core library.
//!
//! Plays and records 16-bit PCM WAV files against a kernel PCM device
//! exposed through the `PcmDevice` trait. Platform backends (the msm
//! ioctl backend in `pcm-stream-msm`) implement `PcmDevice` and plug
//! into the generic transfer engines.
//!
//! ## Architecture
//!
//! ```text
//! pcm-stream-core (this crate)
//! ├── traits/   ← PcmDevice, VolumeControl
//! ├── models/   ← StreamError, StreamConfig, ControlState, SessionReport
//! ├── format/   ← WAV container parsing and writing
//! ├── engine/   ← PcmSource, playback and capture transfer loops
//! ├── session/  ← worker spawning, control commands, session registry
//! └── storage/  ← capture output file writer
//! ```

pub mod engine;
pub mod format;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use engine::capture::CaptureEngine;
pub use engine::playback::PlaybackEngine;
pub use engine::source::PcmSource;
pub use format::wav::{WavHeader, WAV_HEADER_SIZE};
pub use models::config::{CaptureParams, PlaybackParams, StreamConfig, StreamParams};
pub use models::control::{ControlState, RepeatCount};
pub use models::error::StreamError;
pub use models::report::{CaptureReport, PlaybackReport, SessionReport};
pub use session::command::SessionCommand;
pub use session::handle::{spawn_capture, spawn_playback, SessionHandle, SessionKind};
pub use session::registry::SessionRegistry;
pub use storage::wav_writer::WavFileWriter;
pub use traits::device::{PcmDevice, VolumeControl};
