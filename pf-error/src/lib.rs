//! Unified error handling for pamfingerprint
//!
//! This crate provides the single error type shared by the sensor driver,
//! the PAM module and the administration tool.

use std::io;
use std::path::PathBuf;

/// Result type alias using FingerprintError
pub type Result<T> = std::result::Result<T, FingerprintError>;

/// Unified error type for all pamfingerprint operations
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration syntax error on line {line}: {reason}")]
    ConfigSyntax {
        line: usize,
        reason: String,
    },

    #[error("Missing required configuration: [{section}] {key}")]
    MissingConfig {
        section: String,
        key: String,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // Credential Record Errors
    // ============================================================================
    #[error("The user \"{0}\" was not added")]
    UnknownUser(String),

    #[error("The user \"{0}\" is already added")]
    UserExists(String),

    #[error("The user information of \"{user}\" is invalid: {reason}")]
    MalformedRecord {
        user: String,
        reason: String,
    },

    // ============================================================================
    // Session Errors
    // ============================================================================
    #[error("The user is not known: {0}")]
    UserUnknown(String),

    #[error("PAM call {call} failed with code {code}")]
    Pam {
        call: String,
        code: i32,
    },

    // ============================================================================
    // Serial Transport Errors
    // ============================================================================
    #[error("Failed to open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        source: io::Error,
    },

    #[error("Failed to configure serial port {port}: {reason}")]
    SerialConfig {
        port: String,
        reason: String,
    },

    #[error("Unsupported baud rate: {0} (supported: 9600, 19200, 38400, 57600, 115200)")]
    UnsupportedBaudRate(u32),

    // ============================================================================
    // Packet Errors
    // ============================================================================
    #[error("Malformed packet: {0}")]
    BadPacket(String),

    #[error("The received packet is corrupted (checksum {actual:#06x}, expected {expected:#06x})")]
    CorruptedPacket {
        expected: u16,
        actual: u16,
    },

    #[error("Unexpected packet type {actual:#04x} (expected {expected:#04x})")]
    UnexpectedPacket {
        expected: u8,
        actual: u8,
    },

    #[error("Payload too large: {size} bytes (max {max_size} bytes)")]
    PayloadTooLarge {
        size: usize,
        max_size: usize,
    },

    // ============================================================================
    // Sensor Status Errors
    // ============================================================================
    #[error("The sensor address is wrong")]
    WrongAddress,

    #[error("The given fingerprint sensor password is wrong")]
    WrongPassword,

    #[error("Sensor error {code:#04x}: {reason}")]
    Sensor {
        code: u8,
        reason: String,
    },

    // ============================================================================
    // Scan and Match Errors
    // ============================================================================
    #[error("No match found")]
    NoMatch,

    #[error("The template position of the found match ({found}) is not equal to the stored one ({expected})")]
    PositionMismatch {
        expected: i32,
        found: i32,
    },

    #[error("The found match is not assigned to the user")]
    HashMismatch,

    #[error("The fingers do not match")]
    FingerMismatch,

    #[error("The finger is already enrolled at position {0}")]
    AlreadyEnrolled(u16),

    #[error("Template storage is full")]
    StorageFull,

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl FingerprintError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(user: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            user: user.into(),
            reason: reason.into(),
        }
    }

    /// Create a sensor status error
    pub fn sensor(code: u8, reason: impl Into<String>) -> Self {
        Self::Sensor {
            code,
            reason: reason.into(),
        }
    }

    /// Whether the error came from talking to the sensor rather than from
    /// what the sensor reported about the finger.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::SerialOpen { .. }
                | Self::SerialConfig { .. }
                | Self::UnsupportedBaudRate(_)
                | Self::BadPacket(_)
                | Self::CorruptedPacket { .. }
                | Self::UnexpectedPacket { .. }
                | Self::Timeout(_)
        )
    }
}

impl From<String> for FingerprintError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

impl From<&str> for FingerprintError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
