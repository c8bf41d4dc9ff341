//! Playback transfer engine.
//!
//! Drives the fill-then-write loop against the driver's fixed-size
//! buffer pool: prime `buffer_count` chunks, issue the start command,
//! then stream until the source is exhausted (with replays applied),
//! stop is requested, or an I/O error occurs.

use std::sync::Arc;
use std::thread;

use log::{debug, info};

use crate::engine::source::PcmSource;
use crate::models::config::{PlaybackParams, StreamParams};
use crate::models::control::ControlState;
use crate::models::error::StreamError;
use crate::models::report::PlaybackReport;
use crate::traits::device::PcmDevice;

/// Write chunks until the device's buffer pool holds `buffer_count`
/// chunks or the source runs out, whichever comes first. The driver
/// expects its pipeline primed before the start command; a source
/// shorter than the pool simply stops early and playback still
/// starts. Returns (chunks, bytes) written.
pub fn prime<D: PcmDevice>(
    device: &mut D,
    source: &mut PcmSource,
    scratch: &mut [u8],
    buffer_count: usize,
    control: &ControlState,
) -> Result<(u64, u64), StreamError> {
    let mut chunks = 0u64;
    let mut bytes = 0u64;
    for _ in 0..buffer_count {
        if control.stop_requested() {
            break;
        }
        let sz = source.next_chunk(scratch);
        if sz == 0 {
            break;
        }
        write_exact(device, &scratch[..sz])?;
        chunks += 1;
        bytes += sz as u64;
    }
    Ok((chunks, bytes))
}

fn write_exact<D: PcmDevice>(device: &mut D, chunk: &[u8]) -> Result<(), StreamError> {
    let written = device.write_chunk(chunk)?;
    if written != chunk.len() {
        return Err(StreamError::DeviceIo(format!(
            "short device write: {} of {} bytes",
            written,
            chunk.len()
        )));
    }
    Ok(())
}

/// Playback transfer engine.
///
/// Owns the device and the scratch buffer for the session's lifetime;
/// both are released by scope on every exit path.
pub struct PlaybackEngine<D: PcmDevice> {
    device: D,
    control: Arc<ControlState>,
    params: PlaybackParams,
}

impl<D: PcmDevice> PlaybackEngine<D> {
    pub fn new(device: D, control: Arc<ControlState>, params: PlaybackParams) -> Self {
        Self {
            device,
            control,
            params,
        }
    }

    /// Stream `source` to the device. Every device write must be
    /// accepted in full; a short write ends the session with
    /// `DeviceIo`.
    pub fn run(mut self, source: &mut PcmSource) -> Result<PlaybackReport, StreamError> {
        let config = self.device.negotiate(StreamParams {
            sample_rate: self.params.sample_rate,
            channel_count: self.params.channel_count,
        })?;
        if config.buffer_size == 0 {
            return Err(StreamError::ConfigNegotiationFailed(
                "driver reported zero buffer size".into(),
            ));
        }
        info!(
            "playback negotiated: buffer_size={} buffer_count={}",
            config.buffer_size, config.buffer_count
        );

        let mut scratch = vec![0u8; config.buffer_size];

        debug!("prefill");
        let (mut chunks, mut bytes) = prime(
            &mut self.device,
            source,
            &mut scratch,
            config.buffer_count,
            &self.control,
        )?;

        debug!("start playback");
        self.device.start()?;

        let mut replays = 0u32;
        loop {
            if self.control.stop_requested() {
                debug!("stop requested, leaving playback loop");
                break;
            }
            let sz = source.next_chunk(&mut scratch);
            if sz == 0 {
                if self.control.stop_requested() || !self.control.consume_repeat() {
                    break;
                }
                debug!("replaying source");
                source.rewind();
                replays += 1;
                thread::sleep(self.params.repeat_delay);
                continue;
            }
            write_exact(&mut self.device, &scratch[..sz])?;
            chunks += 1;
            bytes += sz as u64;
        }

        // Hold before releasing the device so the final buffered
        // audio drains out of hardware.
        thread::sleep(self.params.drain_delay);
        info!(
            "playback done: {} chunks, {} bytes, {} replays",
            chunks, bytes, replays
        );

        Ok(PlaybackReport {
            chunks_written: chunks,
            bytes_written: bytes,
            replays,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::control::RepeatCount;
    use crate::testing::MockDevice;

    fn quick_params(repeat: RepeatCount) -> PlaybackParams {
        let mut params = PlaybackParams::new(8000, 1).repeat(repeat);
        params.repeat_delay = Duration::ZERO;
        params.drain_delay = Duration::ZERO;
        params
    }

    fn run(
        device: MockDevice,
        data_len: usize,
        repeat: RepeatCount,
    ) -> (
        Result<PlaybackReport, StreamError>,
        Arc<crate::testing::MockLog>,
        Arc<ControlState>,
    ) {
        let log = device.log();
        let control = Arc::new(ControlState::new(repeat));
        let engine = PlaybackEngine::new(device, Arc::clone(&control), quick_params(repeat));
        let mut source = PcmSource::new(vec![0x11; data_len]);
        (engine.run(&mut source), log, control)
    }

    #[test]
    fn issues_ceil_l_over_s_chunks() {
        // L = 2200, S = 512: 4 full chunks + one 152-byte tail.
        let (result, log, _) = run(MockDevice::new(512, 2), 2200, RepeatCount::Off);

        let report = result.unwrap();
        let writes = log.writes.lock().clone();
        assert_eq!(writes, vec![512, 512, 512, 512, 152]);
        assert!(writes.iter().all(|&w| w <= 512));
        assert_eq!(report.chunks_written, 5);
        assert_eq!(report.bytes_written, 2200);
        assert!(log.started());
    }

    #[test]
    fn exact_multiple_has_no_partial_tail() {
        let (result, log, _) = run(MockDevice::new(512, 2), 1024, RepeatCount::Off);

        assert_eq!(log.writes.lock().clone(), vec![512, 512]);
        assert_eq!(result.unwrap().bytes_written, 1024);
    }

    #[test]
    fn short_source_primes_early_and_still_starts() {
        // Source fits in a single chunk, smaller than the pool.
        let (result, log, _) = run(MockDevice::new(512, 4), 300, RepeatCount::Off);

        assert_eq!(log.writes.lock().clone(), vec![300]);
        assert!(log.started());
        assert_eq!(result.unwrap().chunks_written, 1);
    }

    #[test]
    fn finite_repeat_replays_source() {
        // count = 2 means 3 passes total.
        let (result, log, _) = run(MockDevice::new(256, 1), 600, RepeatCount::Times(2));

        let report = result.unwrap();
        assert_eq!(report.replays, 2);
        assert_eq!(report.bytes_written, 3 * 600);
        assert_eq!(report.chunks_written, 3 * 3); // ceil(600/256) = 3 per pass
        let writes = log.writes.lock().clone();
        assert_eq!(writes.len(), 9);
    }

    #[test]
    fn stop_terminates_infinite_repeat() {
        let device = MockDevice::new(128, 1);
        let log = device.log();
        let control = Arc::new(ControlState::new(RepeatCount::Infinite));
        let device = device.stop_after(10, Arc::clone(&control));

        let engine =
            PlaybackEngine::new(device, Arc::clone(&control), quick_params(RepeatCount::Infinite));
        let mut source = PcmSource::new(vec![0x22; 512]);
        let report = engine.run(&mut source).unwrap();

        // Stop lands during the 10th write; at most one more transfer
        // may follow.
        assert!(log.writes.lock().len() <= 11);
        assert!(report.chunks_written >= 10);
    }

    #[test]
    fn stop_mid_pass_skips_remaining_chunks() {
        let device = MockDevice::new(100, 1);
        let log = device.log();
        let control = Arc::new(ControlState::default());
        let device = device.stop_after(2, Arc::clone(&control));

        let engine = PlaybackEngine::new(device, Arc::clone(&control), quick_params(RepeatCount::Off));
        let mut source = PcmSource::new(vec![0x33; 1000]);
        engine.run(&mut source).unwrap();

        assert!(log.writes.lock().len() <= 3);
    }

    #[test]
    fn short_device_write_is_fatal() {
        let device = MockDevice::new(256, 1).short_write_at(3);
        let log = device.log();
        let control = Arc::new(ControlState::default());

        let engine = PlaybackEngine::new(device, control, quick_params(RepeatCount::Off));
        let mut source = PcmSource::new(vec![0x44; 2048]);
        let result = engine.run(&mut source);

        assert!(matches!(result, Err(StreamError::DeviceIo(_))));
        assert_eq!(log.writes.lock().len(), 3);
    }

    #[test]
    fn negotiation_failure_propagates() {
        let device = MockDevice::new(256, 1).fail_negotiate();
        let log = device.log();
        let control = Arc::new(ControlState::default());

        let engine = PlaybackEngine::new(device, control, quick_params(RepeatCount::Off));
        let mut source = PcmSource::new(vec![0; 64]);
        let result = engine.run(&mut source);

        assert!(matches!(
            result,
            Err(StreamError::ConfigNegotiationFailed(_))
        ));
        assert!(!log.started());
    }

    #[test]
    fn negotiation_carries_requested_params() {
        let (_, log, _) = run(MockDevice::new(512, 2), 512, RepeatCount::Off);
        let negotiated = log.negotiated.lock().unwrap();
        assert_eq!(negotiated.sample_rate, 8000);
        assert_eq!(negotiated.channel_count, 1);
    }

    #[test]
    fn empty_source_still_starts_and_exits_cleanly() {
        let (result, log, _) = run(MockDevice::new(512, 2), 0, RepeatCount::Off);

        let report = result.unwrap();
        assert_eq!(report.chunks_written, 0);
        assert!(log.started());
    }
}
