//! The combined event type / event direction byte.
//!
//! ```text
//!   bit 7      bits 6..0
//! ┌─────────┬────────────┐
//! │ dir     │ event type │
//! └─────────┴────────────┘
//! ```

use serde::Serialize;

/// Mask selecting the 7-bit event type.
pub const EVENT_TYPE_MASK: u8 = 0x7F;

/// Bit position of the direction flag.
pub const EVENT_DIR_SHIFT: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDirection {
    Assertion = 0,
    Deassertion = 1,
}

impl EventDirection {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Self::Assertion
        } else {
            Self::Deassertion
        }
    }

    pub fn bit(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Assertion => "Asserted",
            Self::Deassertion => "Deasserted",
        }
    }
}

/// Combine a 7-bit event type and a direction into one byte.
///
/// Bits above the low seven of `event_type` are dropped.
pub fn pack(event_type: u8, direction: EventDirection) -> u8 {
    (event_type & EVENT_TYPE_MASK) | (direction.bit() << EVENT_DIR_SHIFT)
}

/// Split a byte into its event type and direction. Total over all bytes.
pub fn unpack(byte: u8) -> (u8, EventDirection) {
    (
        byte & EVENT_TYPE_MASK,
        EventDirection::from_bit(byte >> EVENT_DIR_SHIFT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip_all_types() {
        for event_type in 0..=EVENT_TYPE_MASK {
            for dir in [EventDirection::Assertion, EventDirection::Deassertion] {
                assert_eq!(unpack(pack(event_type, dir)), (event_type, dir));
            }
        }
    }

    #[test]
    fn deassertion_sets_high_bit() {
        assert_eq!(pack(0x01, EventDirection::Deassertion), 0x81);
        assert_eq!(pack(0x6F, EventDirection::Assertion), 0x6F);
    }

    #[test]
    fn pack_drops_eighth_bit_of_type() {
        assert_eq!(pack(0xFF, EventDirection::Assertion), 0x7F);
    }

    #[test]
    fn unpack_is_total() {
        for byte in 0..=u8::MAX {
            let (event_type, dir) = unpack(byte);
            assert_eq!(pack(event_type, dir), byte);
        }
    }
}
