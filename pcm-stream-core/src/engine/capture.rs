//! Capture transfer engine.
//!
//! Drains the device into a WAV file chunk by chunk until stop is
//! requested. The placeholder header is rewritten with the real sizes
//! on success; any failure after the file was created deletes it so
//! no corrupt container is left behind.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::models::config::{CaptureParams, StreamParams};
use crate::models::control::ControlState;
use crate::models::error::StreamError;
use crate::models::report::CaptureReport;
use crate::storage::wav_writer::WavFileWriter;
use crate::traits::device::PcmDevice;

pub struct CaptureEngine<D: PcmDevice> {
    device: D,
    control: Arc<ControlState>,
    params: CaptureParams,
}

impl<D: PcmDevice> CaptureEngine<D> {
    pub fn new(device: D, control: Arc<ControlState>, params: CaptureParams) -> Self {
        Self {
            device,
            control,
            params,
        }
    }

    /// Record from the device into `path` until stop is requested.
    pub fn run(self, path: &Path) -> Result<CaptureReport, StreamError> {
        self.params.validate()?;

        let mut writer =
            WavFileWriter::create(path, self.params.sample_rate, self.params.channel_count as u16)?;

        let streamed = self.stream(&mut writer).and_then(|(chunks, total)| {
            writer.finalize(total)?;
            Ok((chunks, total))
        });

        match streamed {
            Ok((chunks, total)) => {
                info!("capture done: {} bytes to {}", total, path.display());
                Ok(CaptureReport {
                    chunks_read: chunks,
                    bytes_captured: total as u64,
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                warn!("capture failed, discarding {}: {}", path.display(), e);
                writer.discard();
                Err(e)
            }
        }
    }

    /// The read-then-write loop. Consumes the engine so the device is
    /// closed by scope before the caller rewrites the header.
    fn stream(mut self, writer: &mut WavFileWriter) -> Result<(u64, u32), StreamError> {
        let config = self.device.negotiate(StreamParams {
            sample_rate: self.params.sample_rate,
            channel_count: self.params.channel_count,
        })?;
        if config.buffer_size == 0 {
            return Err(StreamError::ConfigNegotiationFailed(
                "driver reported zero buffer size".into(),
            ));
        }
        info!("capture negotiated: buffer_size={}", config.buffer_size);

        let mut scratch = vec![0u8; config.buffer_size];

        self.device.start()?;
        info!("recording in progress");

        let mut chunks = 0u64;
        let mut total = 0u32;
        while !self.control.stop_requested() {
            let got = self.device.read_chunk(&mut scratch)?;
            if got != scratch.len() {
                return Err(StreamError::DeviceIo(format!(
                    "short device read: {} of {} bytes",
                    got,
                    scratch.len()
                )));
            }
            writer.write_chunk(&scratch)?;
            chunks += 1;
            total += scratch.len() as u32;
        }
        debug!("stop requested, leaving capture loop");

        Ok((chunks, total))
    }
}
