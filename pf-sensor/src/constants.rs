//! Sensor protocol constants

/// Every packet starts with this code
pub const START_CODE: u16 = 0xEF01;

/// Factory default module address
pub const DEFAULT_ADDRESS: u32 = 0xFFFF_FFFF;

/// Serial read timeout in deciseconds (termios VTIME)
pub const READ_TIMEOUT_DECISECONDS: u8 = 20;

/// Upper bound on a single packet payload
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Number of template slots described by one index page
pub const TEMPLATES_PER_PAGE: u16 = 256;

/// Number of template index pages the sensor exposes
pub const TEMPLATE_INDEX_PAGES: u8 = 4;

/// Packet identifiers
pub mod packet {
    pub const COMMAND: u8 = 0x01;
    pub const DATA: u8 = 0x02;
    pub const ACK: u8 = 0x07;
    pub const END_DATA: u8 = 0x08;
}

/// Instruction codes
pub mod instruction {
    pub const READ_IMAGE: u8 = 0x01;
    pub const CONVERT_IMAGE: u8 = 0x02;
    pub const COMPARE_CHARACTERISTICS: u8 = 0x03;
    pub const SEARCH_TEMPLATE: u8 = 0x04;
    pub const CREATE_TEMPLATE: u8 = 0x05;
    pub const STORE_TEMPLATE: u8 = 0x06;
    pub const LOAD_TEMPLATE: u8 = 0x07;
    pub const DOWNLOAD_CHARACTERISTICS: u8 = 0x08;
    pub const DELETE_TEMPLATE: u8 = 0x0C;
    pub const GET_SYSTEM_PARAMETERS: u8 = 0x0F;
    pub const VERIFY_PASSWORD: u8 = 0x13;
    pub const TEMPLATE_COUNT: u8 = 0x1D;
    pub const TEMPLATE_INDEX: u8 = 0x1F;
}

/// Confirmation codes carried in the first byte of an acknowledgement
pub mod status {
    pub const OK: u8 = 0x00;
    pub const COMMUNICATION: u8 = 0x01;
    pub const NO_FINGER: u8 = 0x02;
    pub const READ_IMAGE: u8 = 0x03;
    pub const MESSY_IMAGE: u8 = 0x06;
    pub const FEW_FEATURE_POINTS: u8 = 0x07;
    pub const NOT_MATCHING: u8 = 0x08;
    pub const NO_TEMPLATE_FOUND: u8 = 0x09;
    pub const CHARACTERISTICS_MISMATCH: u8 = 0x0A;
    pub const INVALID_POSITION: u8 = 0x0B;
    pub const LOAD_TEMPLATE: u8 = 0x0C;
    pub const DOWNLOAD_CHARACTERISTICS: u8 = 0x0D;
    pub const PACKET_RESPONSE_FAIL: u8 = 0x0E;
    pub const DELETE_TEMPLATE: u8 = 0x10;
    pub const WRONG_PASSWORD: u8 = 0x13;
    pub const INVALID_IMAGE: u8 = 0x15;
    pub const FLASH: u8 = 0x18;
    pub const INVALID_REGISTER: u8 = 0x1A;
    pub const ADDRESS_CODE: u8 = 0x20;
    pub const PASSWORD_REQUIRED: u8 = 0x21;

    /// Human readable description of a confirmation code
    pub fn describe(code: u8) -> &'static str {
        match code {
            OK => "ok",
            COMMUNICATION => "communication error",
            NO_FINGER => "no finger on the sensor",
            READ_IMAGE => "could not read image",
            MESSY_IMAGE => "the image is too messy",
            FEW_FEATURE_POINTS => "the image contains too few feature points",
            NOT_MATCHING => "the characteristics do not match",
            NO_TEMPLATE_FOUND => "no template found",
            CHARACTERISTICS_MISMATCH => "the characteristics do not match",
            INVALID_POSITION => "could not store template at the given position",
            LOAD_TEMPLATE => "the template could not be read",
            DOWNLOAD_CHARACTERISTICS => "could not download characteristics",
            PACKET_RESPONSE_FAIL => "could not receive follow-up packets",
            DELETE_TEMPLATE => "could not delete template",
            WRONG_PASSWORD => "wrong password",
            INVALID_IMAGE => "the image is invalid",
            FLASH => "error writing to flash",
            INVALID_REGISTER => "invalid register number",
            ADDRESS_CODE => "the address is wrong",
            PASSWORD_REQUIRED => "the password must be verified first",
            _ => "unknown error",
        }
    }
}
