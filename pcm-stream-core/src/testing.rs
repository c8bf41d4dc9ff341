//! Scripted in-memory device for engine and session tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::{StreamConfig, StreamParams};
use crate::models::control::ControlState;
use crate::models::error::StreamError;
use crate::traits::device::{PcmDevice, VolumeControl};

/// What the mock records about device interactions, shared with the
/// test body through `MockDevice::log`.
#[derive(Debug, Default)]
pub struct MockLog {
    pub negotiated: Mutex<Option<StreamParams>>,
    pub writes: Mutex<Vec<usize>>,
    pub reads: AtomicU64,
    started: AtomicBool,
}

impl MockLog {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

/// Volume side channel that records the values it receives.
#[derive(Debug, Default)]
pub struct MockVolume {
    pub values: Mutex<Vec<u32>>,
}

impl VolumeControl for MockVolume {
    fn set_volume(&self, value: u32) -> Result<(), StreamError> {
        self.values.lock().push(value);
        Ok(())
    }
}

/// Scripted device: reports a fixed buffer geometry, records every
/// interaction, and injects failures at chosen transfer indices
/// (1-based, counted separately for reads and writes).
pub struct MockDevice {
    log: Arc<MockLog>,
    buffer_size: usize,
    buffer_count: usize,
    negotiate_fails: bool,
    short_write_at: Option<u64>,
    fail_read_at: Option<u64>,
    short_read_at: Option<u64>,
    stop_after: Option<(u64, Arc<ControlState>)>,
    write_delay: Duration,
    read_delay: Duration,
    volume: Option<Arc<MockVolume>>,
}

impl MockDevice {
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        Self {
            log: Arc::new(MockLog::default()),
            buffer_size,
            buffer_count,
            negotiate_fails: false,
            short_write_at: None,
            fail_read_at: None,
            short_read_at: None,
            stop_after: None,
            write_delay: Duration::ZERO,
            read_delay: Duration::ZERO,
            volume: None,
        }
    }

    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }

    pub fn fail_negotiate(mut self) -> Self {
        self.negotiate_fails = true;
        self
    }

    /// The Nth write is accepted one byte short.
    pub fn short_write_at(mut self, n: u64) -> Self {
        self.short_write_at = Some(n);
        self
    }

    /// The Nth read fails outright.
    pub fn fail_read_at(mut self, n: u64) -> Self {
        self.fail_read_at = Some(n);
        self
    }

    /// The Nth read returns half a chunk.
    pub fn short_read_at(mut self, n: u64) -> Self {
        self.short_read_at = Some(n);
        self
    }

    /// Request stop on `control` once the Nth transfer completes.
    pub fn stop_after(mut self, n: u64, control: Arc<ControlState>) -> Self {
        self.stop_after = Some((n, control));
        self
    }

    pub fn write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn with_volume(mut self, volume: Arc<MockVolume>) -> Self {
        self.volume = Some(volume);
        self
    }

    fn maybe_stop(&self, n: u64) {
        if let Some((at, control)) = &self.stop_after {
            if n == *at {
                control.request_stop();
            }
        }
    }
}

impl PcmDevice for MockDevice {
    fn negotiate(&mut self, requested: StreamParams) -> Result<StreamConfig, StreamError> {
        if self.negotiate_fails {
            return Err(StreamError::ConfigNegotiationFailed(
                "injected negotiation failure".into(),
            ));
        }
        *self.log.negotiated.lock() = Some(requested);
        Ok(StreamConfig {
            sample_rate: requested.sample_rate,
            channel_count: requested.channel_count,
            bits_per_sample: 16,
            buffer_size: self.buffer_size,
            buffer_count: self.buffer_count,
        })
    }

    fn start(&mut self) -> Result<(), StreamError> {
        self.log.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        let n = self.log.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_read_at == Some(n) {
            return Err(StreamError::DeviceIo("injected read failure".into()));
        }
        buf.fill(0x5a);
        let got = if self.short_read_at == Some(n) {
            buf.len() / 2
        } else {
            buf.len()
        };
        self.maybe_stop(n);
        Ok(got)
    }

    fn write_chunk(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        if !self.write_delay.is_zero() {
            thread::sleep(self.write_delay);
        }
        let n = {
            let mut writes = self.log.writes.lock();
            writes.push(buf.len());
            writes.len() as u64
        };
        let accepted = if self.short_write_at == Some(n) {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        self.maybe_stop(n);
        Ok(accepted)
    }

    fn session_id(&self) -> Option<u16> {
        Some(7)
    }

    fn volume_control(&self) -> Option<Arc<dyn VolumeControl>> {
        self.volume
            .as_ref()
            .map(|v| Arc::clone(v) as Arc<dyn VolumeControl>)
    }
}
