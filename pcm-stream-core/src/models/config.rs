use std::time::Duration;

use super::control::RepeatCount;
use super::error::StreamError;

/// Stream parameters requested from the driver at negotiation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub channel_count: u32,
}

/// Driver-negotiated stream configuration.
///
/// Produced once per session by [`PcmDevice::negotiate`] and immutable
/// thereafter. The transfer engines size their scratch buffer to
/// `buffer_size` and prime `buffer_count` chunks before starting
/// playback.
///
/// [`PcmDevice::negotiate`]: crate::traits::device::PcmDevice::negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub sample_rate: u32,
    pub channel_count: u32,
    pub bits_per_sample: u16,
    pub buffer_size: usize,
    pub buffer_count: usize,
}

/// Sample rates the capture path accepts.
pub const CAPTURE_SAMPLE_RATES: [u32; 9] = [
    48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// Parameters for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureParams {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Channel mode: 1 = mono, 2 = stereo.
    pub channel_count: u32,
}

impl CaptureParams {
    pub fn validate(&self) -> Result<(), StreamError> {
        if !CAPTURE_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(StreamError::UnsupportedFormat(format!(
                "invalid sample rate: {}",
                self.sample_rate
            )));
        }
        if !(1..=2).contains(&self.channel_count) {
            return Err(StreamError::UnsupportedFormat(format!(
                "invalid channel mode: {}",
                self.channel_count
            )));
        }
        Ok(())
    }
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            channel_count: 1,
        }
    }
}

/// Parameters for a playback session.
#[derive(Debug, Clone)]
pub struct PlaybackParams {
    pub sample_rate: u32,
    pub channel_count: u32,
    pub repeat: RepeatCount,
    /// Pause between replays, letting the driver drain.
    pub repeat_delay: Duration,
    /// Hold before releasing the device so the final buffered audio
    /// drains out of hardware.
    pub drain_delay: Duration,
}

impl PlaybackParams {
    pub fn new(sample_rate: u32, channel_count: u32) -> Self {
        Self {
            sample_rate,
            channel_count,
            repeat: RepeatCount::Off,
            repeat_delay: Duration::from_secs(1),
            drain_delay: Duration::from_secs(5),
        }
    }

    pub fn repeat(mut self, repeat: RepeatCount) -> Self {
        self.repeat = repeat;
        self
    }
}
