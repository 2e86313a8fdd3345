//! Request/response transport for management-controller commands.
//!
//! Provides the collaborators a platform event sender needs:
//! - [`Transport`] for a single request/response exchange
//! - [`MediumResolver`] for the channel medium currently in use
//! - [`PrivilegeNegotiator`] for raising session privilege
//!
//! Two implementations ship here: [`UnixBridge`] talks to a management bridge
//! over a Unix domain socket, and [`Loopback`] answers in memory for dry runs
//! and tests.

pub mod error;
pub mod loopback;
pub mod message;
pub mod traits;

#[cfg(unix)]
pub mod bridge;
#[cfg(unix)]
pub mod stream;
#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use loopback::{Loopback, ScriptedReply};
pub use message::{
    completion_code_str, ChannelMedium, PrivilegeLevel, Request, Response, CMD_GET_CHANNEL_INFO,
    CMD_PLATFORM_EVENT, CURRENT_CHANNEL, NETFN_APP, NETFN_SENSOR_EVENT,
};
pub use traits::{query_channel_medium, Interface, MediumResolver, PrivilegeNegotiator, Transport};

#[cfg(unix)]
pub use bridge::{BridgeConfig, BridgeConnection, UnixBridge};
#[cfg(unix)]
pub use stream::BridgeStream;
#[cfg(unix)]
pub use uds::BridgeListener;
