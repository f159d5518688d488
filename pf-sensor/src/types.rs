//! Sensor data types

use serde::{Deserialize, Serialize};

/// One of the two working slots holding extracted characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharBuffer {
    One,
    Two,
}

impl CharBuffer {
    pub fn code(self) -> u8 {
        match self {
            CharBuffer::One => 0x01,
            CharBuffer::Two => 0x02,
        }
    }
}

impl std::fmt::Display for CharBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "charbuffer{}", self.code())
    }
}

/// Result of a template search
///
/// `position` and `accuracy` are both -1 when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub position: i32,
    pub accuracy: i32,
}

impl SearchResult {
    pub const NO_MATCH: SearchResult = SearchResult {
        position: -1,
        accuracy: -1,
    };

    /// Matched template position, if any
    pub fn matched(&self) -> Option<u16> {
        if self.position < 0 {
            None
        } else {
            u16::try_from(self.position).ok()
        }
    }
}

/// Module system parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParameters {
    pub status_register: u16,
    pub system_id: u16,
    pub storage_capacity: u16,
    pub security_level: u16,
    pub address: u32,
    /// Packet length code (0 = 32, 1 = 64, 2 = 128, 3 = 256 bytes)
    pub packet_length: u16,
    /// Baud rate as a multiple of 9600
    pub baud_rate: u16,
}

impl SystemParameters {
    /// Decode the acknowledgement payload of a system parameters request
    ///
    /// `payload[0]` is the confirmation code and is not inspected here.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < 17 {
            return None;
        }
        let word = |i: usize| u16::from_be_bytes([payload[i], payload[i + 1]]);
        Some(Self {
            status_register: word(1),
            system_id: word(3),
            storage_capacity: word(5),
            security_level: word(7),
            address: u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]),
            packet_length: word(13),
            baud_rate: word(15),
        })
    }

    /// Packet data size in bytes
    pub fn packet_size(&self) -> usize {
        32usize << self.packet_length.min(3)
    }

    /// Baud rate in bits per second
    pub fn baud_rate_bps(&self) -> u32 {
        self.baud_rate as u32 * 9600
    }
}
