//! Raw serial port access
//!
//! The port is put into raw 8N1 mode with a fixed inter-byte read timeout, so a
//! silent module surfaces as a short read instead of a hang.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

use pf_error::FingerprintError;
use tracing::debug;

use crate::constants::READ_TIMEOUT_DECISECONDS;
use crate::Result;

/// An open, configured serial port
#[derive(Debug)]
pub struct SerialPort {
    file: File,
}

/// Map a baud rate to its termios speed constant
pub fn speed_for(baud_rate: u32) -> Result<libc::speed_t> {
    match baud_rate {
        9_600 => Ok(libc::B9600),
        19_200 => Ok(libc::B19200),
        38_400 => Ok(libc::B38400),
        57_600 => Ok(libc::B57600),
        115_200 => Ok(libc::B115200),
        other => Err(FingerprintError::UnsupportedBaudRate(other)),
    }
}

impl SerialPort {
    /// Open `port` and configure it for `baud_rate`
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let speed = speed_for(baud_rate)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(port)
            .map_err(|source| FingerprintError::SerialOpen {
                port: port.to_string(),
                source,
            })?;

        let fd = file.as_raw_fd();
        let config_err = |call: &str| FingerprintError::SerialConfig {
            port: port.to_string(),
            reason: format!("{}: {}", call, io::Error::last_os_error()),
        };

        // SAFETY: termios is a plain C struct; tcgetattr fills it completely.
        let mut tty: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: fd is owned by `file` and stays open for these calls.
        if unsafe { libc::tcgetattr(fd, &mut tty) } != 0 {
            return Err(config_err("tcgetattr"));
        }

        // SAFETY: tty is a valid termios obtained above.
        unsafe { libc::cfmakeraw(&mut tty) };
        tty.c_cflag |= libc::CLOCAL | libc::CREAD;
        tty.c_cflag &= !(libc::CSTOPB | libc::PARENB | libc::CRTSCTS);
        tty.c_cflag = (tty.c_cflag & !libc::CSIZE) | libc::CS8;
        tty.c_cc[libc::VMIN] = 0;
        tty.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS as libc::cc_t;

        // SAFETY: tty is valid and speed is a termios speed constant.
        unsafe {
            if libc::cfsetispeed(&mut tty, speed) != 0 || libc::cfsetospeed(&mut tty, speed) != 0 {
                return Err(config_err("cfsetspeed"));
            }
            if libc::tcsetattr(fd, libc::TCSANOW, &tty) != 0 {
                return Err(config_err("tcsetattr"));
            }
            // Stale bytes from an earlier session would desynchronise framing
            libc::tcflush(fd, libc::TCIOFLUSH);
        }

        debug!(port, baud_rate, "Serial port opened");
        Ok(Self { file })
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // SAFETY: fd is owned by self.file.
        if unsafe { libc::tcdrain(self.file.as_raw_fd()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
