//! Packet framing
//!
//! Wire layout, all multi-byte fields big-endian:
//!
//! ```text
//! | start 0xEF01 | address u32 | type u8 | length u16 | payload | checksum u16 |
//! ```
//!
//! `length` counts the payload plus the two checksum bytes. The checksum is the
//! low 16 bits of the sum of the type byte, both length bytes and every
//! payload byte.

use std::io::{self, Read, Write};

use pf_error::FingerprintError;

use crate::constants::{MAX_PAYLOAD_SIZE, START_CODE};
use crate::Result;

/// A decoded packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub kind: u8,
    pub payload: Vec<u8>,
}

/// Compute the checksum of a packet
pub fn checksum(kind: u8, payload: &[u8]) -> u16 {
    let length = (payload.len() + 2) as u16;
    let mut sum = kind as u32 + (length >> 8) as u32 + (length & 0xFF) as u32;
    for byte in payload {
        sum += *byte as u32;
    }
    (sum & 0xFFFF) as u16
}

/// Encode a packet for the module at `address`
pub fn encode(address: u32, kind: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FingerprintError::PayloadTooLarge {
            size: payload.len(),
            max_size: MAX_PAYLOAD_SIZE,
        });
    }

    let length = (payload.len() + 2) as u16;
    let mut out = Vec::with_capacity(payload.len() + 11);
    out.extend_from_slice(&START_CODE.to_be_bytes());
    out.extend_from_slice(&address.to_be_bytes());
    out.push(kind);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(kind, payload).to_be_bytes());
    Ok(out)
}

/// Encode and send a packet
pub fn write_packet<W: Write>(writer: &mut W, address: u32, kind: u8, payload: &[u8]) -> Result<()> {
    let bytes = encode(address, kind, payload)?;
    writer.write_all(&bytes).map_err(map_io)?;
    writer.flush().map_err(map_io)?;
    Ok(())
}

/// Read one complete packet
///
/// The address field is not checked; the module answers with its own address.
pub fn read_packet<R: Read>(reader: &mut R) -> Result<Packet> {
    let mut header = [0u8; 9];
    reader.read_exact(&mut header).map_err(map_io)?;

    let start = u16::from_be_bytes([header[0], header[1]]);
    if start != START_CODE {
        return Err(FingerprintError::BadPacket(format!(
            "the received packet does not begin with a valid header ({:#06x})",
            start
        )));
    }

    let kind = header[6];
    let length = u16::from_be_bytes([header[7], header[8]]) as usize;
    if length < 2 {
        return Err(FingerprintError::BadPacket(format!("invalid packet length {}", length)));
    }
    let payload_len = length - 2;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(FingerprintError::PayloadTooLarge {
            size: payload_len,
            max_size: MAX_PAYLOAD_SIZE,
        });
    }

    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload).map_err(map_io)?;

    let mut trailer = [0u8; 2];
    reader.read_exact(&mut trailer).map_err(map_io)?;
    let received = u16::from_be_bytes(trailer);
    let expected = checksum(kind, &payload);
    if received != expected {
        return Err(FingerprintError::CorruptedPacket {
            expected,
            actual: received,
        });
    }

    Ok(Packet { kind, payload })
}

/// A short read means the module stopped answering within the port timeout
fn map_io(e: io::Error) -> FingerprintError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            FingerprintError::Timeout("the sensor did not answer".to_string())
        }
        _ => FingerprintError::Io(e),
    }
}
