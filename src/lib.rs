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

//! pam_fingerprint - PAM service module for serial fingerprint sensors
//!
//! Built as `libpam_fingerprint.so`, exporting `pam_sm_authenticate` and
//! `pam_sm_setcred`. A user is authenticated when the finger on the sensor
//! matches the template position and characteristics hash recorded for them
//! in `/etc/pamfingerprint.conf`.

pub mod audit;
pub mod auth;
pub mod config;
pub mod constants;
pub mod digest;
pub mod enroll;
pub mod ini;
pub mod logging;
pub mod pam;
pub mod scan;
pub mod session;

#[cfg(test)]
pub mod test_utils;
