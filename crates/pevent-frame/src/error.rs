use pevent_transport::ChannelMedium;

/// Errors that can occur while decoding a wire frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame length does not match the channel medium.
    #[error("invalid frame length for {medium}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        medium: ChannelMedium,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors produced while parsing one line of an event file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Fewer than seven fields were present.
    #[error("expected 7 event fields, found {found}")]
    TooFewFields {
        found: usize,
        /// Fields parsed before the line ran out, zero-filled.
        partial: [u8; 7],
    },

    /// Strict mode: a token is not a complete integer literal.
    #[error("field {index}: '{token}' is not an integer")]
    InvalidToken { index: usize, token: String },

    /// Strict mode: a token does not fit in one byte.
    #[error("field {index}: '{token}' does not fit in one byte")]
    OutOfRange { index: usize, token: String },
}
