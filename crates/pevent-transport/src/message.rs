//! Management request/response messages and the enumerations they carry.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

/// Sensor/Event network function.
pub const NETFN_SENSOR_EVENT: u8 = 0x04;

/// Application network function.
pub const NETFN_APP: u8 = 0x06;

/// Platform Event Message command (Sensor/Event netfn).
pub const CMD_PLATFORM_EVENT: u8 = 0x02;

/// Get Channel Info command (App netfn).
pub const CMD_GET_CHANNEL_INFO: u8 = 0x42;

/// Channel number that addresses the channel the request arrived on.
pub const CURRENT_CHANNEL: u8 = 0x0E;

/// A single management request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub netfn: u8,
    pub cmd: u8,
    pub data: Bytes,
}

impl Request {
    pub fn new(netfn: u8, cmd: u8, data: impl Into<Bytes>) -> Self {
        Self {
            netfn,
            cmd,
            data: data.into(),
        }
    }

    /// Get Channel Info for the current channel.
    pub fn get_channel_info() -> Self {
        Self::new(
            NETFN_APP,
            CMD_GET_CHANNEL_INFO,
            Bytes::from_static(&[CURRENT_CHANNEL]),
        )
    }

    /// True if this is a Platform Event Message request.
    pub fn is_platform_event(&self) -> bool {
        self.netfn == NETFN_SENSOR_EVENT && self.cmd == CMD_PLATFORM_EVENT
    }
}

/// A management response. Completion code 0 means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub completion_code: u8,
    pub data: Bytes,
}

impl Response {
    pub fn new(completion_code: u8, data: impl Into<Bytes>) -> Self {
        Self {
            completion_code,
            data: data.into(),
        }
    }

    /// A successful response with no data.
    pub fn ok() -> Self {
        Self::new(0, Bytes::new())
    }

    pub fn is_success(&self) -> bool {
        self.completion_code == 0
    }
}

/// Classification of the channel a session is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMedium {
    Ipmb,
    IcmbV10,
    IcmbV09,
    Lan8023,
    Serial,
    OtherLan,
    PciSmbus,
    SmbusV1,
    SmbusV2,
    Usb1,
    Usb2,
    SystemInterface,
    Unknown(u8),
}

impl ChannelMedium {
    /// Map a channel medium type number to a medium.
    pub fn from_code(code: u8) -> Self {
        match code & 0x7F {
            0x01 => Self::Ipmb,
            0x02 => Self::IcmbV10,
            0x03 => Self::IcmbV09,
            0x04 => Self::Lan8023,
            0x05 => Self::Serial,
            0x06 => Self::OtherLan,
            0x07 => Self::PciSmbus,
            0x08 => Self::SmbusV1,
            0x09 => Self::SmbusV2,
            0x0A => Self::Usb1,
            0x0B => Self::Usb2,
            0x0C => Self::SystemInterface,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Ipmb => 0x01,
            Self::IcmbV10 => 0x02,
            Self::IcmbV09 => 0x03,
            Self::Lan8023 => 0x04,
            Self::Serial => 0x05,
            Self::OtherLan => 0x06,
            Self::PciSmbus => 0x07,
            Self::SmbusV1 => 0x08,
            Self::SmbusV2 => 0x09,
            Self::Usb1 => 0x0A,
            Self::Usb2 => 0x0B,
            Self::SystemInterface => 0x0C,
            Self::Unknown(code) => code,
        }
    }

    /// Over the system interface the event generator must be carried explicitly.
    pub fn is_system_interface(self) -> bool {
        self == Self::SystemInterface
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ipmb => "IPMB (I2C)",
            Self::IcmbV10 => "ICMB v1.0",
            Self::IcmbV09 => "ICMB v0.9",
            Self::Lan8023 => "802.3 LAN",
            Self::Serial => "Serial/Modem (RS-232)",
            Self::OtherLan => "Other LAN",
            Self::PciSmbus => "PCI SMBus",
            Self::SmbusV1 => "SMBus v1.0/1.1",
            Self::SmbusV2 => "SMBus v2.0",
            Self::Usb1 => "USB 1.x",
            Self::Usb2 => "USB 2.x",
            Self::SystemInterface => "System Interface",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ChannelMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown (0x{code:02x})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for ChannelMedium {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let medium = match s.to_ascii_lowercase().as_str() {
            "system" | "system-interface" | "si" => Self::SystemInterface,
            "ipmb" => Self::Ipmb,
            "lan" | "802.3" => Self::Lan8023,
            "other-lan" => Self::OtherLan,
            "serial" => Self::Serial,
            "icmb" => Self::IcmbV10,
            "smbus" => Self::SmbusV2,
            "usb" => Self::Usb2,
            other => {
                return Err(format!(
                    "unknown channel medium '{other}' (expected system, ipmb, lan, other-lan, serial, icmb, smbus, usb)"
                ))
            }
        };
        Ok(medium)
    }
}

/// Session privilege levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeLevel {
    Callback = 0x01,
    User = 0x02,
    Operator = 0x03,
    Administrator = 0x04,
    Oem = 0x05,
}

impl PrivilegeLevel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Callback => "CALLBACK",
            Self::User => "USER",
            Self::Operator => "OPERATOR",
            Self::Administrator => "ADMINISTRATOR",
            Self::Oem => "OEM",
        }
    }
}

/// Human-readable text for a completion code.
pub fn completion_code_str(code: u8) -> Cow<'static, str> {
    let text = match code {
        0x00 => "Command completed normally",
        0xC0 => "Node busy",
        0xC1 => "Invalid command",
        0xC2 => "Invalid command on LUN",
        0xC3 => "Timeout",
        0xC4 => "Out of space",
        0xC5 => "Reservation cancelled or invalid",
        0xC6 => "Request data truncated",
        0xC7 => "Request data length invalid",
        0xC8 => "Request data field length limit exceeded",
        0xC9 => "Parameter out of range",
        0xCA => "Cannot return number of requested data bytes",
        0xCB => "Requested sensor, data, or record not found",
        0xCC => "Invalid data field in request",
        0xCD => "Command illegal for specified sensor or record type",
        0xCE => "Command response could not be provided",
        0xCF => "Cannot execute duplicated request",
        0xD0 => "SDR Repository in update mode",
        0xD1 => "Device firmware in update mode",
        0xD2 => "BMC initialization in progress",
        0xD3 => "Destination unavailable",
        0xD4 => "Insufficient privilege level",
        0xD5 => "Command not supported in present state",
        0xD6 => "Cannot execute command, command disabled",
        0xFF => "Unspecified error",
        other => return Cow::Owned(format!("Unknown (0x{other:02x})")),
    };
    Cow::Borrowed(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_codes_roundtrip() {
        for code in 0x01..=0x0C {
            assert_eq!(ChannelMedium::from_code(code).code(), code);
        }
        assert_eq!(ChannelMedium::from_code(0x0C), ChannelMedium::SystemInterface);
        assert_eq!(ChannelMedium::from_code(0x3C), ChannelMedium::Unknown(0x3C));
    }

    #[test]
    fn medium_ignores_reserved_high_bit() {
        assert_eq!(ChannelMedium::from_code(0x8C), ChannelMedium::SystemInterface);
    }

    #[test]
    fn medium_parses_from_cli_names() {
        assert_eq!(
            "system".parse::<ChannelMedium>().unwrap(),
            ChannelMedium::SystemInterface
        );
        assert_eq!("LAN".parse::<ChannelMedium>().unwrap(), ChannelMedium::Lan8023);
        assert!("carrier-pigeon".parse::<ChannelMedium>().is_err());
    }

    #[test]
    fn completion_code_strings() {
        assert_eq!(completion_code_str(0x00), "Command completed normally");
        assert_eq!(completion_code_str(0xD4), "Insufficient privilege level");
        assert_eq!(completion_code_str(0x42), "Unknown (0x42)");
    }

    #[test]
    fn channel_info_request_targets_current_channel() {
        let req = Request::get_channel_info();
        assert_eq!(req.netfn, NETFN_APP);
        assert_eq!(req.cmd, CMD_GET_CHANNEL_INFO);
        assert_eq!(req.data.as_ref(), &[CURRENT_CHANNEL]);
        assert!(!req.is_platform_event());
    }
}
