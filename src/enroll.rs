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

//! Enrolling and removing users

use std::fmt;
use std::time::Duration;

use pf_error::{FingerprintError, Result};
use pf_sensor::{CharBuffer, FingerprintSensor};
use tracing::{info, warn};

use crate::config::{Config, UserRecord};
use crate::digest::characteristics_hash;
use crate::scan::{wait_for_finger, wait_for_removal};

/// What the operator should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PlaceFinger,
    RemoveFinger,
    PlaceAgain,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::PlaceFinger => write!(f, "Waiting for finger..."),
            Step::RemoveFinger => write!(f, "Remove finger..."),
            Step::PlaceAgain => write!(f, "Waiting for same finger again..."),
        }
    }
}

/// Capture one finger twice, store the template and return its record
pub fn enroll_finger(
    sensor: &mut dyn FingerprintSensor,
    timeout: Option<Duration>,
    prompt: &mut dyn FnMut(Step),
) -> Result<UserRecord> {
    prompt(Step::PlaceFinger);
    wait_for_finger(sensor, timeout)?;
    sensor.convert_image(CharBuffer::One)?;

    if let Some(position) = sensor.search_template()?.matched() {
        return Err(FingerprintError::AlreadyEnrolled(position));
    }

    prompt(Step::RemoveFinger);
    wait_for_removal(sensor, timeout)?;

    prompt(Step::PlaceAgain);
    wait_for_finger(sensor, timeout)?;
    sensor.convert_image(CharBuffer::Two)?;

    if sensor.compare_characteristics()? == 0 {
        return Err(FingerprintError::FingerMismatch);
    }
    if !sensor.create_template()? {
        return Err(FingerprintError::FingerMismatch);
    }

    let position = sensor.store_template(None, CharBuffer::One)?;
    sensor.load_template(position, CharBuffer::One)?;
    let characteristics = sensor.download_characteristics(CharBuffer::One)?;

    Ok(UserRecord {
        position: i32::from(position),
        hash: characteristics_hash(&characteristics),
    })
}

/// Enroll `user` and save the configuration
pub fn add_user(
    config: &mut Config,
    user: &str,
    sensor: &mut dyn FingerprintSensor,
    timeout: Option<Duration>,
    prompt: &mut dyn FnMut(Step),
) -> Result<UserRecord> {
    if config.has_user(user) {
        return Err(FingerprintError::UserExists(user.to_string()));
    }

    let record = enroll_finger(sensor, timeout, prompt)?;
    config.set_user(user, &record);
    config.save()?;

    info!(user, position = record.position, "Added user");
    Ok(record)
}

/// Remove `user`, deleting the stored template when a sensor is given
pub fn remove_user(config: &mut Config, user: &str, sensor: Option<&mut dyn FingerprintSensor>) -> Result<()> {
    if !config.has_user(user) {
        return Err(FingerprintError::UnknownUser(user.to_string()));
    }

    if let Some(sensor) = sensor {
        // A damaged record still gets removed, only its template is left behind
        match config.user_record(user) {
            Ok(record) => match u16::try_from(record.position) {
                Ok(position) => {
                    if !sensor.delete_template(position)? {
                        warn!(user, position, "The sensor did not delete the template");
                    }
                }
                Err(_) => warn!(user, position = record.position, "No template to delete"),
            },
            Err(e) => warn!(user, "Keeping template of unreadable record: {}", e),
        }
    }

    config.remove_user(user);
    config.save()?;
    info!(user, "Removed user");
    Ok(())
}
