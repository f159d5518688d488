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

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pf_error::{FingerprintError, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_CONFIG_PATH, MAX_CONFIG_SIZE, SENSOR_SECTION, USERS_SECTION};
use crate::ini::IniDocument;

/// Stored credential of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Template position on the sensor
    pub position: i32,
    /// SHA-256 hex digest of the template characteristics
    pub hash: String,
}

impl UserRecord {
    /// Parse a `position,hash` entry
    pub fn parse(user: &str, raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        if fields.len() != 2 {
            return Err(FingerprintError::malformed_record(
                user,
                format!("expected 2 fields, found {}", fields.len()),
            ));
        }

        let position = fields[0].parse::<i32>().map_err(|e| {
            FingerprintError::malformed_record(user, format!("template position {:?}: {}", fields[0], e))
        })?;
        if fields[1].is_empty() {
            return Err(FingerprintError::malformed_record(user, "empty fingerprint hash"));
        }

        Ok(Self {
            position,
            hash: fields[1].to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!("{},{}", self.position, self.hash)
    }
}

/// Sensor connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorConfig {
    pub port: String,
    pub baud_rate: u32,
    pub address: u32,
    pub password: u32,
    /// Image capture limit; `None` waits forever
    pub timeout: Option<Duration>,
}

/// Parse a hexadecimal u32, with or without `0x`
pub fn parse_hex(field: &str, value: &str) -> Result<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16)
        .map_err(|e| FingerprintError::invalid_config(field, format!("{:?} is not a 32-bit hex value: {}", value, e)))
}

fn parse_baud_rate(value: &str) -> Result<u32> {
    let baud = value
        .parse::<u32>()
        .map_err(|e| FingerprintError::invalid_config("baudRate", format!("{:?}: {}", value, e)))?;
    if baud < 9600 || baud > 115_200 || baud % 9600 != 0 {
        return Err(FingerprintError::invalid_config(
            "baudRate",
            format!("{} is not a multiple of 9600 between 9600 and 115200", baud),
        ));
    }
    Ok(baud)
}

/// Seconds to a capture limit; zero means unbounded
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// The configuration file
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    document: IniDocument,
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load and parse the file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => FingerprintError::FileNotFound(path.to_path_buf()),
            _ => FingerprintError::FileRead {
                path: path.to_path_buf(),
                source,
            },
        })?;

        // Bounded read: the file may grow after it was opened
        let mut text = String::new();
        file.take(MAX_CONFIG_SIZE + 1)
            .read_to_string(&mut text)
            .map_err(|source| FingerprintError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        if text.len() as u64 > MAX_CONFIG_SIZE {
            return Err(FingerprintError::FileTooLarge {
                path: path.to_path_buf(),
                size: text.len() as u64,
                max_size: MAX_CONFIG_SIZE,
            });
        }

        let document = IniDocument::parse(&text)?;

        debug!(path = %path.display(), users = document.entries(USERS_SECTION).len(), "Loaded configuration");
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.document.contains(USERS_SECTION, user)
    }

    pub fn user_record(&self, user: &str) -> Result<UserRecord> {
        let raw = self
            .document
            .get(USERS_SECTION, user)
            .ok_or_else(|| FingerprintError::UnknownUser(user.to_string()))?;
        UserRecord::parse(user, raw)
    }

    /// Every configured user with its parsed record
    pub fn users(&self) -> Vec<(String, Result<UserRecord>)> {
        self.document
            .entries(USERS_SECTION)
            .into_iter()
            .map(|(user, raw)| (user.to_string(), UserRecord::parse(user, raw)))
            .collect()
    }

    pub fn set_user(&mut self, user: &str, record: &UserRecord) {
        self.document.set(USERS_SECTION, user, &record.render());
    }

    pub fn remove_user(&mut self, user: &str) -> bool {
        self.document.remove(USERS_SECTION, user)
    }

    fn sensor_value(&self, key: &str) -> Result<&str> {
        self.document
            .get(SENSOR_SECTION, key)
            .ok_or_else(|| FingerprintError::MissingConfig {
                section: SENSOR_SECTION.to_string(),
                key: key.to_string(),
            })
    }

    pub fn sensor(&self) -> Result<SensorConfig> {
        let port = self.sensor_value("port")?;
        if port.is_empty() {
            return Err(FingerprintError::invalid_config("port", "empty port"));
        }
        let baud_rate = parse_baud_rate(self.sensor_value("baudRate")?)?;
        let address = parse_hex("address", self.sensor_value("address")?)?;
        let password = parse_hex("password", self.sensor_value("password")?)?;

        let timeout = match self.document.get(SENSOR_SECTION, "timeout") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|e| FingerprintError::invalid_config("timeout", format!("{:?}: {}", raw, e)))?;
                timeout_from_secs(secs)
            }
            None => None,
        };

        Ok(SensorConfig {
            port: port.to_string(),
            baud_rate,
            address,
            password,
            timeout,
        })
    }

    /// Write the configuration back, readable by root only
    pub fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("conf.tmp");
        let write_err = |source| FingerprintError::FileWrite {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp)
            .map_err(write_err)?;
        file.write_all(self.document.render().as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        debug!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }
}

/// Arguments given to the module in the PAM stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArgs {
    pub config_path: PathBuf,
    /// Overrides the configured capture timeout, in seconds
    pub timeout_secs: Option<u64>,
    pub audit_path: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
}

impl Default for ModuleArgs {
    fn default() -> Self {
        Self {
            config_path: Config::default_path(),
            timeout_secs: None,
            audit_path: None,
            debug: false,
            quiet: false,
        }
    }
}

impl ModuleArgs {
    /// Parse `argv`, returning the arguments that were not understood
    pub fn parse<I, S>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();
        let mut unknown = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some(("config", path)) if !path.is_empty() => parsed.config_path = PathBuf::from(path),
                Some(("audit", path)) if !path.is_empty() => parsed.audit_path = Some(PathBuf::from(path)),
                Some(("timeout", secs)) => match secs.parse::<u64>() {
                    Ok(secs) => parsed.timeout_secs = Some(secs),
                    Err(_) => unknown.push(arg.to_string()),
                },
                None if arg == "debug" => parsed.debug = true,
                None if arg == "quiet" => parsed.quiet = true,
                _ => unknown.push(arg.to_string()),
            }
        }

        if !unknown.is_empty() {
            warn!(?unknown, "Ignoring unknown module arguments");
        }
        (parsed, unknown)
    }
}
