use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Requested repeat behaviour for a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    /// Play the source once.
    Off,
    /// Replay the source this many additional times.
    Times(u32),
    /// Replay until stopped.
    Infinite,
}

impl RepeatCount {
    fn encode(self) -> i32 {
        match self {
            RepeatCount::Off => 0,
            RepeatCount::Times(n) => n as i32,
            RepeatCount::Infinite => -1,
        }
    }
}

/// Shared per-session control flags.
///
/// Written from the command-dispatch path and polled by the transfer
/// engine every loop iteration, so both fields are atomics. The
/// repeat counter encodes -1 = infinite, 0 = done, N = replays
/// remaining.
#[derive(Debug)]
pub struct ControlState {
    stop: AtomicBool,
    repeat: AtomicI32,
}

impl ControlState {
    pub fn new(repeat: RepeatCount) -> Self {
        Self {
            stop: AtomicBool::new(false),
            repeat: AtomicI32::new(repeat.encode()),
        }
    }

    /// Ask the transfer engine to terminate. Returns immediately; the
    /// engine observes the flag at its next loop-iteration boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Consume one replay. Returns true if the source should be
    /// replayed; an infinite count is never decremented.
    pub fn consume_repeat(&self) -> bool {
        match self.repeat.load(Ordering::SeqCst) {
            0 => false,
            n if n < 0 => true,
            _ => {
                self.repeat.fetch_sub(1, Ordering::SeqCst);
                true
            }
        }
    }

    /// Replays still pending; `None` means infinite.
    pub fn remaining_repeats(&self) -> Option<u32> {
        let n = self.repeat.load(Ordering::SeqCst);
        if n < 0 {
            None
        } else {
            Some(n as u32)
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(RepeatCount::Off)
    }
}
