use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use pcm_stream_core::models::config::{StreamConfig, StreamParams};
use pcm_stream_core::models::error::StreamError;
use pcm_stream_core::traits::device::{PcmDevice, VolumeControl};

use crate::ioctl::{self, MsmAudioConfig};

/// A PCM device node driven through the msm ioctl interface.
///
/// The descriptor is exclusively owned by the session's transfer
/// engine; the volume side channel operates on a duplicate so the
/// command path never touches this handle.
pub struct MsmPcmDevice {
    file: File,
    path: PathBuf,
}

impl MsmPcmDevice {
    /// Open a device node for playback (write-only).
    pub fn open_output(path: &Path) -> Result<Self, StreamError> {
        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            StreamError::DeviceOpenFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Open a device node for capture (read-only).
    pub fn open_input(path: &Path) -> Result<Self, StreamError> {
        let file = OpenOptions::new().read(true).open(path).map_err(|e| {
            StreamError::DeviceOpenFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    fn fd(&self) -> i32 {
        self.file.as_raw_fd()
    }
}

impl PcmDevice for MsmPcmDevice {
    fn negotiate(&mut self, requested: StreamParams) -> Result<StreamConfig, StreamError> {
        let mut config = MsmAudioConfig::default();
        unsafe { ioctl::audio_get_config(self.fd(), &mut config) }
            .map_err(|e| StreamError::ConfigNegotiationFailed(format!("cannot read config: {}", e)))?;

        config.sample_rate = requested.sample_rate;
        config.channel_count = requested.channel_count;
        unsafe { ioctl::audio_set_config(self.fd(), &config) }
            .map_err(|e| StreamError::ConfigNegotiationFailed(format!("cannot write config: {}", e)))?;

        // Re-read so the returned config is what the driver settled on.
        unsafe { ioctl::audio_get_config(self.fd(), &mut config) }
            .map_err(|e| StreamError::ConfigNegotiationFailed(format!("cannot read config: {}", e)))?;

        debug!(
            "{}: negotiated rate={} channels={} buffer_size={} buffer_count={}",
            self.path.display(),
            config.sample_rate,
            config.channel_count,
            config.buffer_size,
            config.buffer_count
        );

        Ok(StreamConfig {
            sample_rate: config.sample_rate,
            channel_count: config.channel_count,
            bits_per_sample: 16,
            buffer_size: config.buffer_size as usize,
            buffer_count: config.buffer_count as usize,
        })
    }

    fn start(&mut self) -> Result<(), StreamError> {
        let arg: u32 = 0;
        unsafe { ioctl::audio_start(self.fd(), &arg) }.map_err(|e| {
            StreamError::DeviceIo(format!("cannot start {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.file
            .read(buf)
            .map_err(|e| StreamError::DeviceIo(format!("device read: {}", e)))
    }

    fn write_chunk(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        self.file
            .write(buf)
            .map_err(|e| StreamError::DeviceIo(format!("device write: {}", e)))
    }

    fn session_id(&self) -> Option<u16> {
        let mut id: u16 = 0;
        match unsafe { ioctl::audio_get_session_id(self.fd(), &mut id) } {
            Ok(_) => Some(id),
            Err(e) => {
                debug!("{}: no session id capability: {}", self.path.display(), e);
                None
            }
        }
    }

    fn volume_control(&self) -> Option<Arc<dyn VolumeControl>> {
        match self.file.try_clone() {
            Ok(file) => Some(Arc::new(MsmVolumeControl { file })),
            Err(e) => {
                warn!(
                    "{}: cannot duplicate descriptor for volume control: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }
}

/// Volume side channel on a duplicated descriptor.
pub struct MsmVolumeControl {
    file: File,
}

impl VolumeControl for MsmVolumeControl {
    fn set_volume(&self, value: u32) -> Result<(), StreamError> {
        unsafe { ioctl::audio_set_volume(self.file.as_raw_fd(), &value) }
            .map_err(|e| StreamError::DeviceIo(format!("cannot set volume: {}", e)))?;
        Ok(())
    }
}
