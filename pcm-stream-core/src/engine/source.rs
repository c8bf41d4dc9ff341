use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::format::wav::{WavHeader, WAV_HEADER_SIZE};
use crate::models::error::StreamError;

/// In-memory playback source with a copy-and-advance cursor.
///
/// The whole data section is held in memory so replays rewind without
/// touching the filesystem.
#[derive(Debug, Clone)]
pub struct PcmSource {
    data: Vec<u8>,
    pos: usize,
}

impl PcmSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// Load a WAV file: parse and validate the header, then read
    /// exactly `data_sz` bytes of sample data.
    pub fn from_wav_file(path: &Path) -> Result<(WavHeader, Self), StreamError> {
        let mut file = File::open(path)
            .map_err(|e| StreamError::FileIo(format!("cannot open {}: {}", path.display(), e)))?;

        let mut header_bytes = [0u8; WAV_HEADER_SIZE];
        file.read_exact(&mut header_bytes)
            .map_err(|e| StreamError::MalformedContainer(format!("cannot read header: {}", e)))?;
        let header = WavHeader::parse(&header_bytes)?;

        let mut data = vec![0u8; header.data_sz as usize];
        file.read_exact(&mut data).map_err(|e| {
            StreamError::FileIo(format!("cannot read {} data bytes: {}", header.data_sz, e))
        })?;

        Ok((header, Self::new(data)))
    }

    /// Copy the next chunk into `buf` and advance the cursor. Returns
    /// `min(buf.len(), remaining)`; 0 once the source is exhausted.
    pub fn next_chunk(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Reset the cursor to the beginning for a replay.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
