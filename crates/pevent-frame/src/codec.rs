use bytes::{BufMut, Bytes, BytesMut};
use pevent_transport::{ChannelMedium, Request, CMD_PLATFORM_EVENT, NETFN_SENSOR_EVENT};

use crate::bitfield::{self, EventDirection};
use crate::error::{FrameError, Result};

/// Generator id sent ahead of the event on the system interface.
pub const SOFTWARE_GENERATOR_ID: u8 = 0x20;

/// Frame length when the generator is implied by the channel.
pub const CHANNEL_FRAME_LEN: usize = 7;

/// Frame length on the system interface (generator id + event).
pub const SYSTEM_INTERFACE_FRAME_LEN: usize = 8;

/// The seven semantic bytes of a platform event, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventFields {
    /// Event message format revision.
    pub evm_rev: u8,
    pub sensor_type: u8,
    pub sensor_num: u8,
    /// Event direction (bit 7) and event type (bits 6..0).
    pub event_type_dir: u8,
    pub event_data: [u8; 3],
}

impl EventFields {
    pub const LEN: usize = 7;

    pub const fn new(
        evm_rev: u8,
        sensor_type: u8,
        sensor_num: u8,
        event_type_dir: u8,
        data0: u8,
        data1: u8,
        data2: u8,
    ) -> Self {
        Self {
            evm_rev,
            sensor_type,
            sensor_num,
            event_type_dir,
            event_data: [data0, data1, data2],
        }
    }

    pub const fn from_bytes(b: [u8; 7]) -> Self {
        Self::new(b[0], b[1], b[2], b[3], b[4], b[5], b[6])
    }

    pub const fn to_bytes(&self) -> [u8; 7] {
        let [d0, d1, d2] = self.event_data;
        [
            self.evm_rev,
            self.sensor_type,
            self.sensor_num,
            self.event_type_dir,
            d0,
            d1,
            d2,
        ]
    }

    pub fn event_type(&self) -> u8 {
        bitfield::unpack(self.event_type_dir).0
    }

    pub fn direction(&self) -> EventDirection {
        bitfield::unpack(self.event_type_dir).1
    }
}

/// A platform event frame shaped for one channel medium.
///
/// The variant fixes the wire length: 8 bytes for the system interface,
/// 7 for every other medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEventFrame {
    /// System interface: the generator id cannot be inferred and is sent first.
    SystemInterface { generator_id: u8, fields: EventFields },
    /// IPMB, LAN and the rest: the channel implies the generator.
    Channel { fields: EventFields },
}

impl PlatformEventFrame {
    /// Shape `fields` for `medium`.
    pub fn build(medium: ChannelMedium, fields: EventFields) -> Self {
        if medium.is_system_interface() {
            Self::SystemInterface {
                generator_id: SOFTWARE_GENERATOR_ID,
                fields,
            }
        } else {
            Self::Channel { fields }
        }
    }

    /// The semantic fields, without any generator id.
    pub fn fields(&self) -> &EventFields {
        match self {
            Self::SystemInterface { fields, .. } | Self::Channel { fields } => fields,
        }
    }

    /// The explicit generator id, if this frame carries one.
    pub fn generator_id(&self) -> Option<u8> {
        match self {
            Self::SystemInterface { generator_id, .. } => Some(*generator_id),
            Self::Channel { .. } => None,
        }
    }

    /// Length of this frame on the wire.
    pub fn wire_len(&self) -> usize {
        match self {
            Self::SystemInterface { .. } => SYSTEM_INTERFACE_FRAME_LEN,
            Self::Channel { .. } => CHANNEL_FRAME_LEN,
        }
    }

    /// Append the wire bytes to `dst`.
    ///
    /// ```text
    /// system interface: [gen id][evm rev][sensor type][sensor #][type/dir][d0][d1][d2]
    /// other channels:           [evm rev][sensor type][sensor #][type/dir][d0][d1][d2]
    /// ```
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_len());
        if let Some(generator_id) = self.generator_id() {
            dst.put_u8(generator_id);
        }
        dst.put_slice(&self.fields().to_bytes());
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Split raw wire bytes received over `medium` back into a frame.
    pub fn decode(medium: ChannelMedium, src: &[u8]) -> Result<Self> {
        let expected = if medium.is_system_interface() {
            SYSTEM_INTERFACE_FRAME_LEN
        } else {
            CHANNEL_FRAME_LEN
        };
        if src.len() != expected {
            return Err(FrameError::InvalidLength {
                medium,
                expected,
                actual: src.len(),
            });
        }

        let (generator_id, body) = match src.split_first() {
            Some((first, rest)) if expected == SYSTEM_INTERFACE_FRAME_LEN => (Some(*first), rest),
            _ => (None, src),
        };
        let mut bytes = [0u8; EventFields::LEN];
        bytes.copy_from_slice(body);
        let fields = EventFields::from_bytes(bytes);

        Ok(match generator_id {
            Some(generator_id) => Self::SystemInterface {
                generator_id,
                fields,
            },
            None => Self::Channel { fields },
        })
    }

    /// Wrap the frame in a Platform Event Message request.
    pub fn to_request(&self) -> Request {
        Request::new(NETFN_SENSOR_EVENT, CMD_PLATFORM_EVENT, self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMP_HIGH: EventFields = EventFields::new(0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00);

    const MEDIA: [ChannelMedium; 6] = [
        ChannelMedium::SystemInterface,
        ChannelMedium::Ipmb,
        ChannelMedium::Lan8023,
        ChannelMedium::OtherLan,
        ChannelMedium::Serial,
        ChannelMedium::Unknown(0x60),
    ];

    #[test]
    fn system_interface_prefixes_generator_id() {
        let frame = PlatformEventFrame::build(ChannelMedium::SystemInterface, TEMP_HIGH);
        let wire = frame.to_bytes();
        assert_eq!(wire.len(), 8);
        assert_eq!(
            wire.as_ref(),
            &[0x20, 0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00]
        );
        assert_eq!(frame.generator_id(), Some(SOFTWARE_GENERATOR_ID));
    }

    #[test]
    fn other_media_send_fields_unshifted() {
        let frame = PlatformEventFrame::build(ChannelMedium::Ipmb, TEMP_HIGH);
        let wire = frame.to_bytes();
        assert_eq!(wire.as_ref(), &[0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00]);
        assert_eq!(frame.generator_id(), None);
    }

    #[test]
    fn stripping_generator_id_recovers_fields_on_every_medium() {
        for medium in MEDIA {
            let frame = PlatformEventFrame::build(medium, TEMP_HIGH);
            let wire = frame.to_bytes();
            let skip = usize::from(medium.is_system_interface());
            assert_eq!(&wire[skip..], &TEMP_HIGH.to_bytes(), "medium {medium}");
            assert_eq!(wire.len(), frame.wire_len());
        }
    }

    #[test]
    fn system_interface_frame_always_starts_with_generator_id() {
        for seed in 0..=u8::MAX {
            let fields = EventFields::from_bytes([seed; 7]);
            let wire = PlatformEventFrame::build(ChannelMedium::SystemInterface, fields).to_bytes();
            assert_eq!(wire.len(), SYSTEM_INTERFACE_FRAME_LEN);
            assert_eq!(wire[0], SOFTWARE_GENERATOR_ID);
        }
    }

    #[test]
    fn decode_checks_length_against_medium() {
        let wire = [0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00];
        let err = PlatformEventFrame::decode(ChannelMedium::SystemInterface, &wire).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidLength {
                expected: 8,
                actual: 7,
                ..
            }
        ));

        let frame = PlatformEventFrame::decode(ChannelMedium::Lan8023, &wire).unwrap();
        assert_eq!(*frame.fields(), TEMP_HIGH);
    }

    #[test]
    fn decode_keeps_transmitted_generator_id() {
        let wire = [0x41, 0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00];
        let frame = PlatformEventFrame::decode(ChannelMedium::SystemInterface, &wire).unwrap();
        assert_eq!(frame.generator_id(), Some(0x41));
        assert_eq!(*frame.fields(), TEMP_HIGH);
    }

    #[test]
    fn request_uses_platform_event_command() {
        let req = PlatformEventFrame::build(ChannelMedium::Ipmb, TEMP_HIGH).to_request();
        assert!(req.is_platform_event());
        assert_eq!(req.data.len(), CHANNEL_FRAME_LEN);
    }

    #[test]
    fn fields_split_type_and_direction() {
        let fields = EventFields::new(0x04, 0x01, 0x30, 0x81, 0, 0, 0);
        assert_eq!(fields.event_type(), 0x01);
        assert_eq!(fields.direction(), EventDirection::Deassertion);
    }
}
