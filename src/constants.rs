/*
 * This file is part of pamfingerprint.
 *
 * Copyright (C) 2025 pamfingerprint contributors
 *
 * pamfingerprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pamfingerprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pamfingerprint. If not, see <https://www.gnu.org/licenses/>.
 */

//! Paths, names and limits shared by the module and the admin tool

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file read by the PAM module
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pamfingerprint.conf";

/// Section mapping identities to `position,hash`
pub const USERS_SECTION: &str = "Users";

/// Section holding the sensor connection parameters
pub const SENSOR_SECTION: &str = "PyFingerprint";

/// Refuse to parse configuration files larger than this
pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PAMFINGERPRINT_LOG";

/// Present when systemd-journald accepts native log records
pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";

/// Identifier used for syslog(3) records
pub const SYSLOG_IDENT: &[u8] = b"pam_fingerprint\0";

/// Prefix a user-facing notice with the module name and version
pub fn notice(text: &str) -> String {
    format!("pamfingerprint {}: {}", VERSION, text)
}

/// User-facing notices
pub mod notices {
    pub const SENSOR_INIT_FAILED: &str = "Sensor initialization failed!";
    pub const WAITING_FOR_FINGER: &str = "Waiting for finger...";
    pub const ACCESS_GRANTED: &str = "Access granted!";
    pub const ACCESS_DENIED: &str = "Access denied!";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_prefix() {
        assert_eq!(
            notice(notices::ACCESS_GRANTED),
            format!("pamfingerprint {}: Access granted!", VERSION)
        );
    }

    #[test]
    fn test_syslog_ident_is_nul_terminated() {
        assert_eq!(SYSLOG_IDENT.last(), Some(&0u8));
        assert_eq!(SYSLOG_IDENT.iter().filter(|b| **b == 0).count(), 1);
    }
}
