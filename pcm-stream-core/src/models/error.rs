use thiserror::Error;

/// Errors that can occur during a streaming session.
///
/// Failures are local to the session that raised them: they terminate
/// that session's transfer loop and surface as a single failed result
/// to the caller. A short transfer against the device is never
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("cannot open audio device: {0}")]
    DeviceOpenFailed(String),

    #[error("config negotiation failed: {0}")]
    ConfigNegotiationFailed(String),

    #[error("malformed wav container: {0}")]
    MalformedContainer(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("device i/o error: {0}")]
    DeviceIo(String),

    #[error("file i/o error: {0}")]
    FileIo(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
