use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::format::wav::WavHeader;
use crate::models::error::StreamError;

/// Streaming WAV output file for capture sessions.
///
/// `create` writes a placeholder header whose size fields are zero;
/// `finalize` seeks back to offset 0 and rewrites it with the real
/// data length. A session that fails instead calls `discard`, which
/// deletes the file rather than leaving a corrupt container.
pub struct WavFileWriter {
    path: PathBuf,
    file: Option<File>,
    header: WavHeader,
}

impl WavFileWriter {
    pub fn create(path: &Path, sample_rate: u32, num_channels: u16) -> Result<Self, StreamError> {
        let header = WavHeader::build(sample_rate, num_channels);
        let mut file = File::create(path)
            .map_err(|e| StreamError::FileIo(format!("cannot create {}: {}", path.display(), e)))?;
        file.write_all(&header.to_bytes())
            .map_err(|e| StreamError::FileIo(format!("cannot write header: {}", e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            header,
        })
    }

    /// Append one chunk of sample data.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StreamError::FileIo("output file already closed".into()))?;
        file.write_all(data)
            .map_err(|e| StreamError::FileIo(format!("cannot write buffer: {}", e)))
    }

    /// Rewrite the header at offset 0 with the final data size and
    /// close the file.
    pub fn finalize(&mut self, total_bytes: u32) -> Result<(), StreamError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| StreamError::FileIo("output file already closed".into()))?;
        self.header.finalize(total_bytes);
        file.seek(SeekFrom::Start(0))
            .map_err(|e| StreamError::FileIo(e.to_string()))?;
        file.write_all(&self.header.to_bytes())
            .map_err(|e| StreamError::FileIo(e.to_string()))?;
        file.flush().map_err(|e| StreamError::FileIo(e.to_string()))?;
        Ok(())
    }

    /// Close and delete the file after a failed session.
    pub fn discard(mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("cannot remove {}: {}", self.path.display(), e);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
