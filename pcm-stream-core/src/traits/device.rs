use std::sync::Arc;

use crate::models::config::{StreamConfig, StreamParams};
use crate::models::error::StreamError;

/// Interface to a kernel PCM device node.
///
/// Implemented by platform backends (the msm ioctl backend in
/// `pcm-stream-msm`) and by the in-crate mock used for engine tests.
/// A device is exclusively owned by one transfer engine for the
/// session's lifetime; release happens by scope when the device is
/// dropped.
pub trait PcmDevice: Send {
    /// Negotiate the stream configuration: read the driver's current
    /// config, overwrite rate and channel count, push it back, and
    /// return the driver's answer. Called once per session.
    fn negotiate(&mut self, requested: StreamParams) -> Result<StreamConfig, StreamError>;

    /// Issue the start command. For playback the driver expects its
    /// buffer pool primed before this is called.
    fn start(&mut self) -> Result<(), StreamError>;

    /// Blocking read of one chunk. A conforming driver fills `buf`
    /// completely; the engines treat anything else as fatal.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// Blocking write of one chunk. Returns the number of bytes the
    /// driver accepted.
    fn write_chunk(&mut self, buf: &[u8]) -> Result<usize, StreamError>;

    /// Driver session id, where the capability tier supports it.
    fn session_id(&self) -> Option<u16> {
        None
    }

    /// Volume side channel usable from the command-dispatch path while
    /// the engine owns the device. `None` if the device has no volume
    /// capability.
    fn volume_control(&self) -> Option<Arc<dyn VolumeControl>> {
        None
    }
}

/// Session-volume side channel, independent of the transfer loop.
pub trait VolumeControl: Send + Sync {
    fn set_volume(&self, value: u32) -> Result<(), StreamError>;
}
