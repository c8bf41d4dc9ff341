//! # pcm-stream-msm
//!
//! Linux backend for `pcm-stream-core`: drives msm PCM device nodes
//! (`/dev/msm_pcm_out`, `/dev/msm_pcm_in`) through their ioctl
//! interface and implements the core `PcmDevice` trait.

mod device;
mod ioctl;

pub use device::{MsmPcmDevice, MsmVolumeControl};
pub use ioctl::MsmAudioConfig;

/// Default playback device node.
pub const DEFAULT_OUTPUT_DEVICE: &str = "/dev/msm_pcm_out";
/// Default capture device node.
pub const DEFAULT_INPUT_DEVICE: &str = "/dev/msm_pcm_in";
