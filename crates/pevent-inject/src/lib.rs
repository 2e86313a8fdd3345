//! Platform event injection.
//!
//! Sends one canned sample event, or replays every event described in a
//! text file, over any [`pevent_transport::Interface`].

pub mod config;
pub mod error;
pub mod replay;
pub mod sender;

pub use config::InjectConfig;
pub use error::{InjectError, Result};
pub use replay::{
    replay_file, replay_lines, LineOutcome, LineOutcomeKind, OverallStatus, Replay, ReplaySummary,
};
pub use sender::{send_platform_event, send_sample_event, SentEvent};
