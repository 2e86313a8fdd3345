use std::path::PathBuf;

/// Errors that can occur while injecting platform events.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] pevent_transport::TransportError),

    /// No canned event has this number.
    #[error("invalid event number: {0}")]
    UnknownSample(u8),

    /// The controller did not respond.
    #[error("Platform Event Message command failed: no response")]
    NoResponse,

    /// The controller answered with a non-zero completion code.
    #[error("Platform Event Message command failed: {message}")]
    CompletionCode { code: u8, message: String },

    /// The event file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, InjectError>;
