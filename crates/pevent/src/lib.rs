//! Platform event injection for management controllers.
//!
//! pevent builds Platform Event Message requests, shaped for the channel
//! medium in use, and sends them one canned sample at a time or by replaying
//! an event file line by line.
//!
//! # Crate Structure
//!
//! - [`transport`]: Request/response transport (Unix bridge, loopback)
//! - [`frame`]: Frame building, event-file parsing, record decoding
//! - [`inject`]: Single-event sending and batch replay

/// Re-export transport types.
pub mod transport {
    pub use pevent_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pevent_frame::*;
}

/// Re-export injection types.
pub mod inject {
    pub use pevent_inject::*;
}
