//! CHIRP message and service types

use std::fmt;

/// Port number of an offered service
///
/// Service ports are allocated dynamically, so they should stay within the
/// ephemeral range (49152-65535) reserved by the IANA for temporary use.
pub type Port = u16;

/// CHIRP message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    /// Ask hosts offering a service to reply with an OFFER
    Request = 0x01,
    /// Announce that a service is available
    Offer = 0x02,
    /// Announce that a service is no longer available
    Depart = 0x03,
}

impl MessageType {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Request),
            0x02 => Some(Self::Offer),
            0x03 => Some(Self::Depart),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "REQUEST",
            Self::Offer => "OFFER",
            Self::Depart => "DEPART",
        };
        write!(f, "{name}")
    }
}

/// CHIRP service identifiers
///
/// Each identifier tags the category of downstream protocol reachable on the
/// advertised port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ServiceIdentifier {
    /// Control endpoint
    Control = 0x01,
    /// Heartbeat endpoint
    Heartbeat = 0x02,
    /// Monitoring endpoint
    Monitoring = 0x03,
    /// Data endpoint
    Data = 0x04,
}

impl ServiceIdentifier {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Control),
            0x02 => Some(Self::Heartbeat),
            0x03 => Some(Self::Monitoring),
            0x04 => Some(Self::Data),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Control => "CONTROL",
            Self::Heartbeat => "HEARTBEAT",
            Self::Monitoring => "MONITORING",
            Self::Data => "DATA",
        };
        write!(f, "{name}")
    }
}
