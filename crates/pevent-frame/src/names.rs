//! Display strings for sensor types and event offsets.

/// Name of a standard sensor type code.
pub fn sensor_type_name(code: u8) -> &'static str {
    match code {
        0x01 => "Temperature",
        0x02 => "Voltage",
        0x03 => "Current",
        0x04 => "Fan",
        0x05 => "Physical Security",
        0x06 => "Platform Security",
        0x07 => "Processor",
        0x08 => "Power Supply",
        0x09 => "Power Unit",
        0x0A => "Cooling Device",
        0x0B => "Other",
        0x0C => "Memory",
        0x0D => "Drive Slot / Bay",
        0x0E => "POST Memory Resize",
        0x0F => "System Firmware Progress",
        0x10 => "Event Logging Disabled",
        0x11 => "Watchdog1",
        0x12 => "System Event",
        0x13 => "Critical Interrupt",
        0x14 => "Button / Switch",
        0x15 => "Module / Board",
        0x16 => "Microcontroller / Coprocessor",
        0x17 => "Add-in Card",
        0x18 => "Chassis",
        0x19 => "Chip Set",
        0x1A => "Other FRU",
        0x1B => "Cable / Interconnect",
        0x1C => "Terminator",
        0x1D => "System Boot Initiated",
        0x1E => "Boot Error",
        0x1F => "OS Boot",
        0x20 => "OS Critical Stop",
        0x21 => "Slot / Connector",
        0x22 => "System ACPI Power State",
        0x23 => "Watchdog2",
        0x24 => "Platform Alert",
        0x25 => "Entity Presence",
        0x26 => "Monitor ASIC",
        0x27 => "LAN",
        0x28 => "Management Subsystem Health",
        0x29 => "Battery",
        0x2A => "Session Audit",
        0x2B => "Version Change",
        0x2C => "FRU State",
        0xC0..=0xFF => "OEM",
        _ => "Reserved",
    }
}

/// Broad class of a 7-bit event/reading type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Unspecified,
    Threshold,
    GenericDiscrete,
    SensorSpecific,
    Oem,
    Reserved,
}

impl EventClass {
    pub fn of(event_type: u8) -> Self {
        match event_type {
            0x00 => Self::Unspecified,
            0x01 => Self::Threshold,
            0x02..=0x0C => Self::GenericDiscrete,
            0x6F => Self::SensorSpecific,
            0x70..=0x7F => Self::Oem,
            _ => Self::Reserved,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Threshold => "Threshold",
            Self::GenericDiscrete => "Generic Discrete",
            Self::SensorSpecific => "Sensor-specific Discrete",
            Self::Oem => "OEM",
            Self::Reserved => "Reserved",
        }
    }
}

/// Threshold crossing named by the low nibble of event data 1.
pub fn threshold_event(offset: u8) -> Option<&'static str> {
    Some(match offset & 0x0F {
        0x00 => "Lower Non-critical going low",
        0x01 => "Lower Non-critical going high",
        0x02 => "Lower Critical going low",
        0x03 => "Lower Critical going high",
        0x04 => "Lower Non-recoverable going low",
        0x05 => "Lower Non-recoverable going high",
        0x06 => "Upper Non-critical going low",
        0x07 => "Upper Non-critical going high",
        0x08 => "Upper Critical going low",
        0x09 => "Upper Critical going high",
        0x0A => "Upper Non-recoverable going low",
        0x0B => "Upper Non-recoverable going high",
        _ => return None,
    })
}

/// Sensor-specific offsets for the sensor types injected most often.
pub fn sensor_specific_event(sensor_type: u8, offset: u8) -> Option<&'static str> {
    Some(match (sensor_type, offset & 0x0F) {
        (0x0C, 0x00) => "Correctable ECC",
        (0x0C, 0x01) => "Uncorrectable ECC",
        (0x0C, 0x02) => "Parity",
        (0x0C, 0x03) => "Memory Scrub Failed",
        (0x0C, 0x04) => "Memory Device Disabled",
        (0x0C, 0x05) => "Correctable ECC logging limit reached",
        (0x07, 0x00) => "IERR",
        (0x07, 0x01) => "Thermal Trip",
        (0x07, 0x07) => "Presence detected",
        (0x08, 0x00) => "Presence detected",
        (0x08, 0x01) => "Failure detected",
        (0x08, 0x03) => "Power Supply AC lost",
        (0x05, 0x00) => "General Chassis intrusion",
        (0x10, 0x02) => "Log area reset/cleared",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_type_names() {
        assert_eq!(sensor_type_name(0x01), "Temperature");
        assert_eq!(sensor_type_name(0x0C), "Memory");
        assert_eq!(sensor_type_name(0xC5), "OEM");
        assert_eq!(sensor_type_name(0x00), "Reserved");
    }

    #[test]
    fn event_classes() {
        assert_eq!(EventClass::of(0x01), EventClass::Threshold);
        assert_eq!(EventClass::of(0x07), EventClass::GenericDiscrete);
        assert_eq!(EventClass::of(0x6F), EventClass::SensorSpecific);
        assert_eq!(EventClass::of(0x72), EventClass::Oem);
        assert_eq!(EventClass::of(0x40), EventClass::Reserved);
    }

    #[test]
    fn threshold_offsets_use_low_nibble() {
        assert_eq!(threshold_event(0x59), Some("Upper Critical going high"));
        assert_eq!(threshold_event(0x52), Some("Lower Critical going low"));
        assert_eq!(threshold_event(0x0E), None);
    }
}
