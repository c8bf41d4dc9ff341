//! Session workers.
//!
//! Each session runs its transfer engine on a dedicated worker thread
//! that exclusively owns the device and scratch buffer. The handle
//! returned to the dispatch path only touches the shared control
//! flags and the volume side channel, so nothing here ever blocks on
//! the transfer loop.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::error;

use crate::engine::capture::CaptureEngine;
use crate::engine::playback::PlaybackEngine;
use crate::engine::source::PcmSource;
use crate::models::config::{CaptureParams, PlaybackParams};
use crate::models::control::ControlState;
use crate::models::error::StreamError;
use crate::models::report::SessionReport;
use crate::session::command::SessionCommand;
use crate::traits::device::{PcmDevice, VolumeControl};

/// Which pipeline a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Playback,
    Capture,
}

/// Handle to a session running on its own worker thread.
pub struct SessionHandle {
    kind: SessionKind,
    control: Arc<ControlState>,
    volume: Option<Arc<dyn VolumeControl>>,
    outcome: mpsc::Receiver<Result<SessionReport, StreamError>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SessionHandle {
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Request cooperative termination. Returns immediately; the
    /// engine observes the flag after its current device transfer, so
    /// worst-case latency is one chunk's transfer time.
    pub fn stop(&self) {
        self.control.request_stop();
    }

    /// Forward a volume change to the driver side channel.
    pub fn set_volume(&self, value: u32) -> Result<(), StreamError> {
        match &self.volume {
            Some(ctl) => ctl.set_volume(value),
            None => Err(StreamError::InvalidCommand(
                "session has no volume control".into(),
            )),
        }
    }

    /// Apply a parsed control command to this session. Playback
    /// accepts stop and volume; capture accepts stop only.
    pub fn apply(&self, command: SessionCommand) -> Result<(), StreamError> {
        match command {
            SessionCommand::Stop => {
                self.stop();
                Ok(())
            }
            SessionCommand::Volume(value) => match self.kind {
                SessionKind::Playback => self.set_volume(value),
                SessionKind::Capture => Err(StreamError::InvalidCommand(
                    "capture sessions only accept stop".into(),
                )),
            },
        }
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map(|w| w.is_finished()).unwrap_or(true)
    }

    /// Block until the session completes and return its result.
    pub fn wait(mut self) -> Result<SessionReport, StreamError> {
        let result = self
            .outcome
            .recv()
            .map_err(|_| StreamError::DeviceIo("session worker exited without a result".into()));
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        result?
    }
}

/// Spawn a playback session over `device`, streaming `source`.
pub fn spawn_playback<D>(device: D, mut source: PcmSource, params: PlaybackParams) -> SessionHandle
where
    D: PcmDevice + 'static,
{
    let control = Arc::new(ControlState::new(params.repeat));
    let volume = device.volume_control();
    let (tx, rx) = mpsc::channel();

    let worker_control = Arc::clone(&control);
    let worker = thread::Builder::new()
        .name("pcm-playback".into())
        .spawn(move || {
            let engine = PlaybackEngine::new(device, worker_control, params);
            let result = engine.run(&mut source).map(SessionReport::Playback);
            if let Err(ref e) = result {
                error!("playback session failed: {}", e);
            }
            let _ = tx.send(result);
        })
        .expect("failed to spawn playback worker");

    SessionHandle {
        kind: SessionKind::Playback,
        control,
        volume,
        outcome: rx,
        worker: Some(worker),
    }
}

/// Spawn a capture session over `device`, recording into `path`.
pub fn spawn_capture<D>(device: D, params: CaptureParams, path: PathBuf) -> SessionHandle
where
    D: PcmDevice + 'static,
{
    let control = Arc::new(ControlState::default());
    let (tx, rx) = mpsc::channel();

    let worker_control = Arc::clone(&control);
    let worker = thread::Builder::new()
        .name("pcm-capture".into())
        .spawn(move || {
            let engine = CaptureEngine::new(device, worker_control, params);
            let result = engine.run(&path).map(SessionReport::Capture);
            if let Err(ref e) = result {
                error!("capture session failed: {}", e);
            }
            let _ = tx.send(result);
        })
        .expect("failed to spawn capture worker");

    SessionHandle {
        kind: SessionKind::Capture,
        control,
        volume: None,
        outcome: rx,
        worker: Some(worker),
    }
}
