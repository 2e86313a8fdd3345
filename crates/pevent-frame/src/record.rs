use std::fmt;

use serde::Serialize;

use crate::bitfield::{self, EventDirection};
use crate::codec::EventFields;
use crate::names::{self, EventClass};

/// Generator id shown on injected records. Hardware-originated records carry
/// a controller slave address here instead.
pub const RECORD_GENERATOR_ID: u16 = 0x0002;

/// Display form of a platform event, shaped like a standard event log record.
///
/// Never transmitted. Record id and generator id are presentation values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub record_id: u16,
    pub generator_id: u16,
    pub evm_rev: u8,
    pub sensor_type: u8,
    pub sensor_num: u8,
    pub event_type: u8,
    pub event_direction: EventDirection,
    pub event_data: [u8; 3],
}

impl EventRecord {
    /// Decode semantic fields. Pure; independent of the channel medium.
    pub fn decode(fields: &EventFields) -> Self {
        let (event_type, event_direction) = bitfield::unpack(fields.event_type_dir);
        Self {
            record_id: 0,
            generator_id: RECORD_GENERATOR_ID,
            evm_rev: fields.evm_rev,
            sensor_type: fields.sensor_type,
            sensor_num: fields.sensor_num,
            event_type,
            event_direction,
            event_data: fields.event_data,
        }
    }

    /// Re-pack into the seven semantic fields.
    pub fn to_fields(&self) -> EventFields {
        let [d0, d1, d2] = self.event_data;
        EventFields::new(
            self.evm_rev,
            self.sensor_type,
            self.sensor_num,
            bitfield::pack(self.event_type, self.event_direction),
            d0,
            d1,
            d2,
        )
    }

    pub fn sensor_type_name(&self) -> &'static str {
        names::sensor_type_name(self.sensor_type)
    }

    pub fn event_class(&self) -> EventClass {
        EventClass::of(self.event_type)
    }

    /// Best available description of what happened.
    pub fn description(&self) -> String {
        let offset = self.event_data[0];
        let known = match self.event_class() {
            EventClass::Threshold => names::threshold_event(offset),
            EventClass::SensorSpecific => names::sensor_specific_event(self.sensor_type, offset),
            _ => None,
        };
        match known {
            Some(text) => text.to_string(),
            None => format!(
                "{} event, offset 0x{:02x}",
                self.event_class().name(),
                offset & 0x0F
            ),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4x} | {} #0x{:02x} | {} | {} | data {:02x}{:02x}{:02x}",
            self.record_id,
            self.sensor_type_name(),
            self.sensor_num,
            self.description(),
            self.event_direction.label(),
            self.event_data[0],
            self.event_data[1],
            self.event_data[2],
        )
    }
}
