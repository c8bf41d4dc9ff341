use std::path::PathBuf;

/// Result of a completed playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Chunks written to the device, priming included.
    pub chunks_written: u64,
    pub bytes_written: u64,
    /// Times the source was replayed after the initial pass.
    pub replays: u32,
}

/// Result of a completed capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub chunks_read: u64,
    pub bytes_captured: u64,
    /// Finalized output file.
    pub path: PathBuf,
}

/// Session outcome delivered through the result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReport {
    Playback(PlaybackReport),
    Capture(CaptureReport),
}
