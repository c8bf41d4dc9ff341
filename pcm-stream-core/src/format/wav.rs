//! WAV container parsing and writing.
//!
//! Playback reads and validates the fixed 44-byte header; capture
//! writes it twice, first as a placeholder and again with the real
//! sizes once the total byte count is known.

use crate::models::error::StreamError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

const RIFF_ID: &[u8; 4] = b"RIFF";
const WAVE_ID: &[u8; 4] = b"WAVE";
const FMT_ID: &[u8; 4] = b"fmt ";
const DATA_ID: &[u8; 4] = b"data";

/// PCM format code in the fmt chunk.
const FORMAT_PCM: u16 = 1;
/// Size of the PCM fmt chunk body.
const FMT_CHUNK_SIZE: u32 = 16;

/// Fixed-layout RIFF/WAVE container descriptor.
///
/// Layout (little-endian):
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    riff_sz = 36 + data_sz
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  num_channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * num_channels * bps / 8
/// [32-33]  block_align = num_channels * bps / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_sz
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_id: [u8; 4],
    pub riff_sz: u32,
    pub riff_fmt: [u8; 4],
    pub fmt_id: [u8; 4],
    pub fmt_sz: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_id: [u8; 4],
    pub data_sz: u32,
}

impl WavHeader {
    /// Parse and validate a playback header.
    ///
    /// Tag mismatches are `MalformedContainer`; a container that is
    /// RIFF/WAVE but not 16-bit PCM is `UnsupportedFormat`.
    pub fn parse(bytes: &[u8]) -> Result<Self, StreamError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(StreamError::MalformedContainer(format!(
                "header truncated at {} bytes",
                bytes.len()
            )));
        }

        let header = Self {
            riff_id: tag(bytes, 0),
            riff_sz: read_u32(bytes, 4),
            riff_fmt: tag(bytes, 8),
            fmt_id: tag(bytes, 12),
            fmt_sz: read_u32(bytes, 16),
            audio_format: read_u16(bytes, 20),
            num_channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
            data_id: tag(bytes, 36),
            data_sz: read_u32(bytes, 40),
        };

        if &header.riff_id != RIFF_ID || &header.riff_fmt != WAVE_ID || &header.fmt_id != FMT_ID {
            return Err(StreamError::MalformedContainer(
                "not a riff/wave file".into(),
            ));
        }
        if header.audio_format != FORMAT_PCM || header.fmt_sz != FMT_CHUNK_SIZE {
            return Err(StreamError::UnsupportedFormat("not pcm format".into()));
        }
        if header.bits_per_sample != 16 {
            return Err(StreamError::UnsupportedFormat(format!(
                "{} bits per sample",
                header.bits_per_sample
            )));
        }

        Ok(header)
    }

    /// Build a capture header with zeroed size fields, to be patched
    /// by [`finalize`](Self::finalize) once the data length is known.
    pub fn build(sample_rate: u32, num_channels: u16) -> Self {
        Self {
            riff_id: *RIFF_ID,
            riff_sz: 0,
            riff_fmt: *WAVE_ID,
            fmt_id: *FMT_ID,
            fmt_sz: FMT_CHUNK_SIZE,
            audio_format: FORMAT_PCM,
            num_channels,
            sample_rate,
            byte_rate: sample_rate * num_channels as u32 * 2,
            block_align: num_channels * 2,
            bits_per_sample: 16,
            data_id: *DATA_ID,
            data_sz: 0,
        }
    }

    /// Set the size fields once the total captured byte count is
    /// known. Must be rewritten at file offset 0 afterwards.
    pub fn finalize(&mut self, total_bytes: u32) {
        self.data_sz = total_bytes;
        self.riff_sz = total_bytes + 36;
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let mut out = [0u8; WAV_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.riff_id);
        out[4..8].copy_from_slice(&self.riff_sz.to_le_bytes());
        out[8..12].copy_from_slice(&self.riff_fmt);
        out[12..16].copy_from_slice(&self.fmt_id);
        out[16..20].copy_from_slice(&self.fmt_sz.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(&self.data_id);
        out[40..44].copy_from_slice(&self.data_sz.to_le_bytes());
        out
    }
}

fn tag(bytes: &[u8], at: usize) -> [u8; 4] {
    [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_header_magic_and_pcm_fields() {
        let bytes = WavHeader::build(48000, 2).to_bytes();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");
        // PCM format code = 1, fmt chunk size = 16
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(
            u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            16
        );
    }

    #[test]
    fn built_header_derived_fields() {
        let header = WavHeader::build(48000, 2);
        assert_eq!(header.byte_rate, 192000); // 48000 * 2 * 16/8
        assert_eq!(header.block_align, 4); // 2 * 16/8
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_sz, 0);
        assert_eq!(header.riff_sz, 0);
    }

    #[test]
    fn finalize_sets_both_sizes() {
        for total in [0u32, 1, 88200, 1 << 24] {
            let mut header = WavHeader::build(44100, 2);
            header.finalize(total);
            assert_eq!(header.data_sz, total);
            assert_eq!(header.riff_sz, total + 36);
        }
    }

    #[test]
    fn parse_roundtrips_built_header() {
        let mut built = WavHeader::build(22050, 1);
        built.finalize(4096);
        let parsed = WavHeader::parse(&built.to_bytes()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn parse_rejects_bad_tags() {
        let good = WavHeader::build(8000, 1).to_bytes();

        for at in [0usize, 8, 12] {
            let mut bytes = good;
            bytes[at] ^= 0xff;
            assert!(
                matches!(
                    WavHeader::parse(&bytes),
                    Err(StreamError::MalformedContainer(_))
                ),
                "tag at {} not rejected",
                at
            );
        }
    }

    #[test]
    fn parse_rejects_non_pcm() {
        let mut header = WavHeader::build(8000, 1);
        header.audio_format = 6; // a-law
        assert!(matches!(
            WavHeader::parse(&header.to_bytes()),
            Err(StreamError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_odd_fmt_chunk_size() {
        let mut header = WavHeader::build(8000, 1);
        header.fmt_sz = 18;
        assert!(matches!(
            WavHeader::parse(&header.to_bytes()),
            Err(StreamError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_bit_depth() {
        for bits in [8u16, 24, 32] {
            let mut header = WavHeader::build(8000, 1);
            header.bits_per_sample = bits;
            assert!(matches!(
                WavHeader::parse(&header.to_bytes()),
                Err(StreamError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn parse_rejects_truncated_header() {
        let bytes = WavHeader::build(8000, 1).to_bytes();
        assert!(matches!(
            WavHeader::parse(&bytes[..43]),
            Err(StreamError::MalformedContainer(_))
        ));
    }
}
