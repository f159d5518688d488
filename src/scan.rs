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

//! Waiting on the finger
//!
//! The module has no "finger present" interrupt; the host polls image capture.
//! Each poll is a serial round trip, which paces the loop.

use std::time::{Duration, Instant};

use pf_error::{FingerprintError, Result};
use pf_sensor::FingerprintSensor;
use tracing::trace;

/// Poll until an image is captured; `None` waits forever
pub fn wait_for_finger(sensor: &mut dyn FingerprintSensor, timeout: Option<Duration>) -> Result<()> {
    let started = Instant::now();
    let mut polls = 0u64;
    while !sensor.read_image()? {
        polls += 1;
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Err(FingerprintError::Timeout(format!(
                    "no finger was placed within {:?}",
                    limit
                )));
            }
        }
    }
    trace!(polls, "Image captured");
    Ok(())
}

/// Poll until the finger has been lifted
pub fn wait_for_removal(sensor: &mut dyn FingerprintSensor, timeout: Option<Duration>) -> Result<()> {
    let started = Instant::now();
    while sensor.read_image()? {
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Err(FingerprintError::Timeout(format!(
                    "the finger was not removed within {:?}",
                    limit
                )));
            }
        }
    }
    Ok(())
}
