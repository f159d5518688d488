//! Driver for ZFM-family optical fingerprint sensors
//!
//! Talks the module's packet protocol over a serial line:
//! - `packet` - framing and checksums
//! - `serial` - raw termios port setup
//! - `device` - the command set, generic over any `Read + Write` transport
//!
//! Template matching happens on the module; the host only issues commands
//! and reads back positions and characteristics.

pub mod constants;
pub mod device;
pub mod packet;
pub mod serial;
mod types;

pub use device::Sensor;
pub use serial::SerialPort;
pub use types::*;

use pf_error::FingerprintError;

pub type Result<T> = std::result::Result<T, FingerprintError>;

/// Operations offered by a fingerprint sensor module
///
/// Implemented by [`Sensor`] for real hardware. Callers hold it as a trait
/// object so tests can substitute a double.
pub trait FingerprintSensor {
    /// Check the configured password against the module.
    /// `Ok(false)` means the module rejected it.
    fn verify_password(&mut self) -> Result<bool>;

    /// Capture an image into the image buffer.
    /// `Ok(false)` means no finger was on the sensor.
    fn read_image(&mut self) -> Result<bool>;

    /// Extract characteristics from the image buffer into `buffer`.
    fn convert_image(&mut self, buffer: CharBuffer) -> Result<()>;

    /// Search the whole template store with char buffer 1.
    fn search_template(&mut self) -> Result<SearchResult>;

    /// Load the stored template at `position` into `buffer`.
    fn load_template(&mut self, position: u16, buffer: CharBuffer) -> Result<()>;

    /// Download the characteristics held in `buffer`.
    fn download_characteristics(&mut self, buffer: CharBuffer) -> Result<Vec<u8>>;

    fn system_parameters(&mut self) -> Result<SystemParameters>;

    fn template_count(&mut self) -> Result<u16>;

    /// Occupancy of the 256 positions covered by index `page`.
    fn template_index(&mut self, page: u8) -> Result<Vec<bool>>;

    /// Combine both char buffers into a template.
    /// `Ok(false)` means the two scans do not belong to the same finger.
    fn create_template(&mut self) -> Result<bool>;

    /// Store `buffer` at `position`, or at the first free slot when `None`.
    /// Returns the position used.
    fn store_template(&mut self, position: Option<u16>, buffer: CharBuffer) -> Result<u16>;

    fn delete_template(&mut self, position: u16) -> Result<bool>;

    /// Accuracy score of char buffer 1 against char buffer 2, 0 when they differ.
    fn compare_characteristics(&mut self) -> Result<u16>;
}
