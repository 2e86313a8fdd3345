//! Platform event frames: building, parsing and decoding.
//!
//! A platform event is seven semantic bytes. On the system interface the
//! wire frame is prefixed with a software generator id; on every other
//! channel the generator is implied by the channel and the seven bytes go
//! out as they are.
//!
//! - [`bitfield`] packs the event type / direction byte
//! - [`codec`] builds and splits wire frames
//! - [`parser`] turns one line of an event file into event fields
//! - [`record`] decodes event fields into a displayable record

pub mod bitfield;
pub mod codec;
pub mod error;
pub mod names;
pub mod parser;
pub mod record;
pub mod sample;

pub use bitfield::{pack, unpack, EventDirection};
pub use codec::{
    EventFields, PlatformEventFrame, CHANNEL_FRAME_LEN, SOFTWARE_GENERATOR_ID,
    SYSTEM_INTERFACE_FRAME_LEN,
};
pub use error::{FrameError, ParseError, Result};
pub use parser::{
    hex_dump, parse_byte_literal, parse_line, parse_line_with, ParseMode, ParsedLine,
};
pub use record::{EventRecord, RECORD_GENERATOR_ID};
pub use sample::{sample_event, SampleEvent, SAMPLE_EVENTS};
