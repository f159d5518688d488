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

//! The caller side of an authentication attempt
//!
//! A session answers who is asking and carries notices back to them. The PAM
//! handle is one implementation; the admin tool runs the same procedure
//! against a terminal.

use pf_error::{FingerprintError, Result};

pub trait Session {
    /// User requesting access on someone else's behalf (`PAM_RUSER`)
    fn requesting_user(&mut self) -> Result<Option<String>>;

    /// User being authenticated, prompting for it if the application allows
    fn target_user(&mut self) -> Result<Option<String>>;

    /// Name of the service asking for authentication
    fn service(&mut self) -> Option<String>;

    /// Show an informational message
    fn notify(&mut self, message: &str) -> Result<()>;
}

fn non_empty(user: Option<String>) -> Option<String> {
    user.filter(|u| !u.is_empty())
}

/// Identity to authenticate: the requesting user, else the target user
///
/// An empty target user is returned as is. No record is keyed by it, so the
/// lookup treats it like any unconfigured user.
pub fn resolve_identity<S: Session + ?Sized>(session: &mut S) -> Result<String> {
    if let Some(user) = non_empty(session.requesting_user()?) {
        return Ok(user);
    }
    session
        .target_user()?
        .ok_or_else(|| FingerprintError::UserUnknown("no user name in session".to_string()))
}

/// Session for running the procedure from a terminal
#[derive(Debug, Clone)]
pub struct TerminalSession {
    user: String,
    service: String,
}

impl TerminalSession {
    pub fn new(user: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            service: service.into(),
        }
    }
}

impl Session for TerminalSession {
    fn requesting_user(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn target_user(&mut self) -> Result<Option<String>> {
        Ok(Some(self.user.clone()))
    }

    fn service(&mut self) -> Option<String> {
        Some(self.service.clone())
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        println!("{}", message);
        Ok(())
    }
}
