use std::collections::HashMap;

use parking_lot::Mutex;

use crate::models::error::StreamError;
use crate::models::report::SessionReport;
use crate::session::command::SessionCommand;
use crate::session::handle::SessionHandle;

/// Active sessions keyed by operator-assigned id.
///
/// The command-dispatch path resolves `-id=` tokens here; the map is
/// the only state shared between dispatch and the session workers.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<u32, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `id`, returning any handle it
    /// displaced.
    pub fn insert(&self, id: u32, handle: SessionHandle) -> Option<SessionHandle> {
        self.sessions.lock().insert(id, handle)
    }

    /// Apply a control command to the session registered under `id`.
    /// An unknown id is rejected without touching any in-flight
    /// transfer.
    pub fn dispatch(&self, id: u32, command: SessionCommand) -> Result<(), StreamError> {
        let sessions = self.sessions.lock();
        match sessions.get(&id) {
            Some(handle) => handle.apply(command),
            None => Err(StreamError::InvalidCommand(format!(
                "no active session with id {}",
                id
            ))),
        }
    }

    /// Remove a session handle so the caller can wait on it.
    pub fn take(&self, id: u32) -> Option<SessionHandle> {
        self.sessions.lock().remove(&id)
    }

    /// Request stop on every active session.
    pub fn stop_all(&self) {
        for handle in self.sessions.lock().values() {
            handle.stop();
        }
    }

    /// Collect the results of sessions whose workers have exited.
    pub fn reap(&self) -> Vec<(u32, Result<SessionReport, StreamError>)> {
        let finished: Vec<u32> = self
            .sessions
            .lock()
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        let mut results = Vec::with_capacity(finished.len());
        for id in finished {
            if let Some(handle) = self.take(id) {
                results.push((id, handle.wait()));
            }
        }
        results
    }

    /// Wait out every remaining session and collect the results.
    pub fn wait_all(&self) -> Vec<(u32, Result<SessionReport, StreamError>)> {
        let ids: Vec<u32> = self.sessions.lock().keys().copied().collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(handle) = self.take(id) {
                results.push((id, handle.wait()));
            }
        }
        results
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
