//! Command set of the sensor module
//!
//! Every command is a single command packet answered by one acknowledgement
//! packet whose first payload byte is the confirmation code. Downloads follow
//! the acknowledgement with data packets terminated by an end-of-data packet.

use std::io::{Read, Write};

use pf_error::FingerprintError;
use tracing::{debug, trace};

use crate::constants::{instruction, packet, status, TEMPLATES_PER_PAGE, TEMPLATE_INDEX_PAGES};
use crate::packet::{read_packet, write_packet};
use crate::serial::SerialPort;
use crate::types::{CharBuffer, SearchResult, SystemParameters};
use crate::{FingerprintSensor, Result};

/// Largest characteristics download accepted before giving up
const MAX_DOWNLOAD_SIZE: usize = 4096;

/// A sensor module reachable over `T`
#[derive(Debug)]
pub struct Sensor<T> {
    transport: T,
    address: u32,
    password: u32,
}

impl Sensor<SerialPort> {
    /// Open the serial port and bind to the module at `address`
    ///
    /// No traffic is exchanged; call [`FingerprintSensor::verify_password`]
    /// before anything else.
    pub fn open(port: &str, baud_rate: u32, address: u32, password: u32) -> Result<Self> {
        let transport = SerialPort::open(port, baud_rate)?;
        Ok(Self::with_transport(transport, address, password))
    }
}

impl<T: Read + Write> Sensor<T> {
    pub fn with_transport(transport: T, address: u32, password: u32) -> Self {
        Self {
            transport,
            address,
            password,
        }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a command and return the acknowledgement payload
    fn command(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        trace!(instruction = payload.first().copied().unwrap_or_default(), "Sending command");
        write_packet(&mut self.transport, self.address, packet::COMMAND, payload)?;

        let reply = read_packet(&mut self.transport)?;
        if reply.kind != packet::ACK {
            return Err(FingerprintError::UnexpectedPacket {
                expected: packet::ACK,
                actual: reply.kind,
            });
        }
        if reply.payload.is_empty() {
            return Err(FingerprintError::BadPacket("empty acknowledgement".to_string()));
        }
        Ok(reply.payload)
    }

    fn first_free_position(&mut self) -> Result<u16> {
        let capacity = self.system_parameters()?.storage_capacity;
        let pages = capacity.div_ceil(TEMPLATES_PER_PAGE).min(TEMPLATE_INDEX_PAGES as u16) as u8;

        for page in 0..pages {
            let used = self.template_index(page)?;
            for (i, taken) in used.iter().enumerate() {
                let position = page as u16 * TEMPLATES_PER_PAGE + i as u16;
                if position >= capacity {
                    break;
                }
                if !taken {
                    return Ok(position);
                }
            }
        }
        Err(FingerprintError::StorageFull)
    }
}

/// Turn a confirmation code into an error
pub fn status_error(code: u8) -> FingerprintError {
    match code {
        status::ADDRESS_CODE => FingerprintError::WrongAddress,
        status::WRONG_PASSWORD => FingerprintError::WrongPassword,
        other => FingerprintError::sensor(other, status::describe(other)),
    }
}

fn word(payload: &[u8], at: usize) -> Result<u16> {
    payload
        .get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| FingerprintError::BadPacket(format!("acknowledgement too short ({} bytes)", payload.len())))
}

impl<T: Read + Write> FingerprintSensor for Sensor<T> {
    fn verify_password(&mut self) -> Result<bool> {
        let pw = self.password.to_be_bytes();
        let reply = self.command(&[instruction::VERIFY_PASSWORD, pw[0], pw[1], pw[2], pw[3]])?;
        match reply[0] {
            status::OK => Ok(true),
            status::WRONG_PASSWORD => Ok(false),
            code => Err(status_error(code)),
        }
    }

    fn read_image(&mut self) -> Result<bool> {
        let reply = self.command(&[instruction::READ_IMAGE])?;
        match reply[0] {
            status::OK => Ok(true),
            status::NO_FINGER => Ok(false),
            code => Err(status_error(code)),
        }
    }

    fn convert_image(&mut self, buffer: CharBuffer) -> Result<()> {
        let reply = self.command(&[instruction::CONVERT_IMAGE, buffer.code()])?;
        match reply[0] {
            status::OK => Ok(()),
            code => Err(status_error(code)),
        }
    }

    fn search_template(&mut self) -> Result<SearchResult> {
        let count = self.system_parameters()?.storage_capacity.to_be_bytes();
        let reply = self.command(&[
            instruction::SEARCH_TEMPLATE,
            CharBuffer::One.code(),
            0x00,
            0x00,
            count[0],
            count[1],
        ])?;
        match reply[0] {
            status::OK => Ok(SearchResult {
                position: word(&reply, 1)? as i32,
                accuracy: word(&reply, 3)? as i32,
            }),
            status::NO_TEMPLATE_FOUND => Ok(SearchResult::NO_MATCH),
            code => Err(status_error(code)),
        }
    }

    fn load_template(&mut self, position: u16, buffer: CharBuffer) -> Result<()> {
        let pos = position.to_be_bytes();
        let reply = self.command(&[instruction::LOAD_TEMPLATE, buffer.code(), pos[0], pos[1]])?;
        match reply[0] {
            status::OK => Ok(()),
            code => Err(status_error(code)),
        }
    }

    fn download_characteristics(&mut self, buffer: CharBuffer) -> Result<Vec<u8>> {
        let reply = self.command(&[instruction::DOWNLOAD_CHARACTERISTICS, buffer.code()])?;
        if reply[0] != status::OK {
            return Err(status_error(reply[0]));
        }

        let mut characteristics = Vec::new();
        loop {
            let data = read_packet(&mut self.transport)?;
            if data.kind != packet::DATA && data.kind != packet::END_DATA {
                return Err(FingerprintError::UnexpectedPacket {
                    expected: packet::DATA,
                    actual: data.kind,
                });
            }
            characteristics.extend_from_slice(&data.payload);
            if characteristics.len() > MAX_DOWNLOAD_SIZE {
                return Err(FingerprintError::PayloadTooLarge {
                    size: characteristics.len(),
                    max_size: MAX_DOWNLOAD_SIZE,
                });
            }
            if data.kind == packet::END_DATA {
                break;
            }
        }

        debug!(bytes = characteristics.len(), %buffer, "Downloaded characteristics");
        Ok(characteristics)
    }

    fn system_parameters(&mut self) -> Result<SystemParameters> {
        let reply = self.command(&[instruction::GET_SYSTEM_PARAMETERS])?;
        if reply[0] != status::OK {
            return Err(status_error(reply[0]));
        }
        SystemParameters::from_payload(&reply)
            .ok_or_else(|| FingerprintError::BadPacket(format!("system parameters too short ({} bytes)", reply.len())))
    }

    fn template_count(&mut self) -> Result<u16> {
        let reply = self.command(&[instruction::TEMPLATE_COUNT])?;
        match reply[0] {
            status::OK => word(&reply, 1),
            code => Err(status_error(code)),
        }
    }

    fn template_index(&mut self, page: u8) -> Result<Vec<bool>> {
        if page >= TEMPLATE_INDEX_PAGES {
            return Err(FingerprintError::generic(format!("The given index page {} is invalid", page)));
        }
        let reply = self.command(&[instruction::TEMPLATE_INDEX, page])?;
        if reply[0] != status::OK {
            return Err(status_error(reply[0]));
        }

        // Each byte covers eight positions, least significant bit first
        let used = reply[1..]
            .iter()
            .flat_map(|byte| (0..8).map(move |bit| (byte >> bit) & 0x01 == 0x01))
            .collect();
        Ok(used)
    }

    fn create_template(&mut self) -> Result<bool> {
        let reply = self.command(&[instruction::CREATE_TEMPLATE])?;
        match reply[0] {
            status::OK => Ok(true),
            status::CHARACTERISTICS_MISMATCH => Ok(false),
            code => Err(status_error(code)),
        }
    }

    fn store_template(&mut self, position: Option<u16>, buffer: CharBuffer) -> Result<u16> {
        let position = match position {
            Some(p) => p,
            None => self.first_free_position()?,
        };
        let pos = position.to_be_bytes();
        let reply = self.command(&[instruction::STORE_TEMPLATE, buffer.code(), pos[0], pos[1]])?;
        match reply[0] {
            status::OK => Ok(position),
            code => Err(status_error(code)),
        }
    }

    fn delete_template(&mut self, position: u16) -> Result<bool> {
        let pos = position.to_be_bytes();
        let reply = self.command(&[instruction::DELETE_TEMPLATE, pos[0], pos[1], 0x00, 0x01])?;
        match reply[0] {
            status::OK => Ok(true),
            status::DELETE_TEMPLATE => Ok(false),
            code => Err(status_error(code)),
        }
    }

    fn compare_characteristics(&mut self) -> Result<u16> {
        let reply = self.command(&[instruction::COMPARE_CHARACTERISTICS])?;
        match reply[0] {
            status::OK => word(&reply, 1),
            status::NOT_MATCHING => Ok(0),
            code => Err(status_error(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ADDRESS;
    use crate::packet::encode;
    use std::io::{self, Cursor};

    /// Replays canned module replies and records what was sent
    struct ScriptedTransport {
        replies: Cursor<Vec<u8>>,
        sent: Vec<u8>,
    }

    impl Read for ScriptedTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.replies.read(buf)
        }
    }

    impl Write for ScriptedTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn reply(kind: u8, payload: &[u8]) -> Vec<u8> {
        encode(DEFAULT_ADDRESS, kind, payload).unwrap()
    }

    fn ack(payload: &[u8]) -> Vec<u8> {
        reply(packet::ACK, payload)
    }

    fn system_parameters_ack(capacity: u16) -> Vec<u8> {
        let cap = capacity.to_be_bytes();
        ack(&[
            0x00, 0x00, 0x00, 0x00, 0x09, cap[0], cap[1], 0x00, 0x05, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x03, 0x00, 0x06,
        ])
    }

    fn sensor(replies: Vec<Vec<u8>>) -> Sensor<ScriptedTransport> {
        Sensor::with_transport(
            ScriptedTransport {
                replies: Cursor::new(replies.concat()),
                sent: Vec::new(),
            },
            DEFAULT_ADDRESS,
            0x0000_0000,
        )
    }

    #[test]
    fn test_verify_password_ok() {
        let mut s = sensor(vec![ack(&[status::OK])]);
        assert!(s.verify_password().unwrap());
        let sent = s.into_inner().sent;
        assert_eq!(sent[9], instruction::VERIFY_PASSWORD);
    }

    #[test]
    fn test_verify_password_wrong() {
        let mut s = sensor(vec![ack(&[status::WRONG_PASSWORD])]);
        assert!(!s.verify_password().unwrap());
    }

    #[test]
    fn test_verify_password_wrong_address() {
        let mut s = sensor(vec![ack(&[status::ADDRESS_CODE])]);
        assert!(matches!(s.verify_password(), Err(FingerprintError::WrongAddress)));
    }

    #[test]
    fn test_verify_password_no_answer() {
        let mut s = sensor(vec![]);
        assert!(matches!(s.verify_password(), Err(FingerprintError::Timeout(_))));
    }

    #[test]
    fn test_read_image_no_finger() {
        let mut s = sensor(vec![ack(&[status::NO_FINGER]), ack(&[status::OK])]);
        assert!(!s.read_image().unwrap());
        assert!(s.read_image().unwrap());
    }

    #[test]
    fn test_read_image_failure() {
        let mut s = sensor(vec![ack(&[status::READ_IMAGE])]);
        let err = s.read_image().unwrap_err();
        assert!(matches!(err, FingerprintError::Sensor { code: status::READ_IMAGE, .. }));
    }

    #[test]
    fn test_convert_image_messy() {
        let mut s = sensor(vec![ack(&[status::MESSY_IMAGE])]);
        assert!(s.convert_image(CharBuffer::One).is_err());
    }

    #[test]
    fn test_search_template_match() {
        let mut s = sensor(vec![system_parameters_ack(1000), ack(&[status::OK, 0x00, 0x07, 0x00, 0x64])]);
        let result = s.search_template().unwrap();
        assert_eq!(result, SearchResult { position: 7, accuracy: 100 });

        // The search covers the whole storage capacity
        let sent = s.into_inner().sent;
        let search = &sent[12..];
        assert_eq!(&search[9..15], &[instruction::SEARCH_TEMPLATE, 0x01, 0x00, 0x00, 0x03, 0xE8]);
    }

    #[test]
    fn test_search_template_no_match() {
        let mut s = sensor(vec![system_parameters_ack(1000), ack(&[status::NO_TEMPLATE_FOUND])]);
        assert_eq!(s.search_template().unwrap(), SearchResult::NO_MATCH);
    }

    #[test]
    fn test_download_characteristics_gathers_data_packets() {
        let mut s = sensor(vec![
            ack(&[status::OK]),
            reply(packet::DATA, &[3, 1, 87]),
            reply(packet::DATA, &[0, 255]),
            reply(packet::END_DATA, &[9]),
        ]);
        assert_eq!(s.download_characteristics(CharBuffer::One).unwrap(), vec![3, 1, 87, 0, 255, 9]);
    }

    #[test]
    fn test_download_characteristics_rejects_stray_packet() {
        let mut s = sensor(vec![ack(&[status::OK]), reply(packet::ACK, &[0x00])]);
        assert!(matches!(
            s.download_characteristics(CharBuffer::One),
            Err(FingerprintError::UnexpectedPacket { .. })
        ));
    }

    #[test]
    fn test_load_template_invalid_position() {
        let mut s = sensor(vec![ack(&[status::LOAD_TEMPLATE])]);
        assert!(s.load_template(12, CharBuffer::One).is_err());
    }

    #[test]
    fn test_template_index_bits() {
        let mut bitmap = vec![status::OK, 0b0000_0101];
        bitmap.extend(std::iter::repeat(0u8).take(31));
        let mut s = sensor(vec![ack(&bitmap)]);
        let used = s.template_index(0).unwrap();
        assert_eq!(used.len(), 256);
        assert!(used[0]);
        assert!(!used[1]);
        assert!(used[2]);
    }

    #[test]
    fn test_template_index_invalid_page() {
        let mut s = sensor(vec![]);
        assert!(s.template_index(TEMPLATE_INDEX_PAGES).is_err());
    }

    #[test]
    fn test_store_template_first_free() {
        let mut bitmap = vec![status::OK, 0b0000_0111];
        bitmap.extend(std::iter::repeat(0u8).take(31));
        let mut s = sensor(vec![system_parameters_ack(200), ack(&bitmap), ack(&[status::OK])]);
        assert_eq!(s.store_template(None, CharBuffer::One).unwrap(), 3);
    }

    #[test]
    fn test_store_template_full() {
        let mut bitmap = vec![status::OK];
        bitmap.extend(std::iter::repeat(0xFFu8).take(32));
        let mut s = sensor(vec![system_parameters_ack(10), ack(&bitmap)]);
        assert!(matches!(s.store_template(None, CharBuffer::One), Err(FingerprintError::StorageFull)));
    }

    #[test]
    fn test_create_template_mismatch() {
        let mut s = sensor(vec![ack(&[status::CHARACTERISTICS_MISMATCH])]);
        assert!(!s.create_template().unwrap());
    }

    #[test]
    fn test_delete_template() {
        let mut s = sensor(vec![ack(&[status::OK]), ack(&[status::DELETE_TEMPLATE])]);
        assert!(s.delete_template(3).unwrap());
        assert!(!s.delete_template(3).unwrap());
    }

    #[test]
    fn test_template_count_and_compare() {
        let mut s = sensor(vec![ack(&[status::OK, 0x00, 0x02]), ack(&[status::NOT_MATCHING])]);
        assert_eq!(s.template_count().unwrap(), 2);
        assert_eq!(s.compare_characteristics().unwrap(), 0);
    }

    #[test]
    fn test_unexpected_reply_kind() {
        let mut s = sensor(vec![reply(packet::DATA, &[0x00])]);
        assert!(matches!(s.read_image(), Err(FingerprintError::UnexpectedPacket { .. })));
    }
}
