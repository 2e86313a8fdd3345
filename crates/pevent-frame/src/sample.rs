use crate::codec::EventFields;

/// A canned event that can be injected by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleEvent {
    pub id: u8,
    pub description: &'static str,
    pub fields: EventFields,
}

pub static SAMPLE_EVENTS: [SampleEvent; 3] = [
    SampleEvent {
        id: 1,
        description: "Temperature - Upper Critical - Going High",
        fields: EventFields::new(0x04, 0x01, 0x30, 0x01, 0x59, 0x00, 0x00),
    },
    SampleEvent {
        id: 2,
        description: "Voltage Threshold - Lower Critical - Going Low",
        fields: EventFields::new(0x04, 0x02, 0x60, 0x01, 0x52, 0x00, 0x00),
    },
    SampleEvent {
        id: 3,
        description: "Memory - Correctable ECC",
        fields: EventFields::new(0x04, 0x0C, 0x53, 0x6F, 0x00, 0x00, 0x00),
    },
];

pub fn sample_event(id: u8) -> Option<&'static SampleEvent> {
    SAMPLE_EVENTS.iter().find(|event| event.id == id)
}
