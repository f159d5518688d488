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

//! Tracing setup
//!
//! Inside a PAM stack stdout and stderr belong to the application, so the
//! module logs to the systemd journal, or to syslog's authpriv facility on
//! systems without journald. The admin tool logs to stderr.

use std::ffi::CString;
use std::fmt::{self, Write};
use std::path::Path;
use std::sync::Once;

use libc::c_char;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::constants::{JOURNALD_SOCKET, LOG_ENV, SYSLOG_IDENT};

static INIT: Once = Once::new();

const SYSLOG_FORMAT: &[u8] = b"%s\0";

fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Set up logging for the PAM module. Later calls are no-ops.
pub fn init_module(debug: bool) {
    INIT.call_once(|| {
        let filter = env_filter(debug);

        if Path::new(JOURNALD_SOCKET).exists() {
            if let Ok(journald) = tracing_journald::layer() {
                let journald = journald.with_syslog_identifier("pam_fingerprint".to_string());
                // The host application may already own the global subscriber
                let _ = tracing_subscriber::registry().with(journald).with(filter).try_init();
                return;
            }
        }

        let _ = tracing_subscriber::registry()
            .with(SyslogLayer::new())
            .with(filter)
            .try_init();
    });
}

/// Set up stderr logging for the admin tool
pub fn init_cli(verbose: bool) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter(verbose))
            .try_init();
    });
}

fn syslog_priority(level: &Level) -> libc::c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        Level::DEBUG | Level::TRACE => libc::LOG_DEBUG,
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn into_line(self) -> String {
        format!("{}{}", self.message, self.fields)
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Forwards events to syslog(3) under the authpriv facility
struct SyslogLayer;

impl SyslogLayer {
    fn new() -> Self {
        // SAFETY: the identifier is a NUL-terminated static, as openlog keeps the pointer
        unsafe {
            libc::openlog(
                SYSLOG_IDENT.as_ptr() as *const c_char,
                libc::LOG_PID,
                libc::LOG_AUTHPRIV,
            );
        }
        SyslogLayer
    }
}

impl<S: Subscriber> Layer<S> for SyslogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = visitor.into_line().replace('\0', " ");
        let Ok(text) = CString::new(line) else {
            return;
        };
        // SAFETY: both pointers are valid NUL-terminated strings for the call
        unsafe {
            libc::syslog(
                syslog_priority(event.metadata().level()),
                SYSLOG_FORMAT.as_ptr() as *const c_char,
                text.as_ptr(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_syslog_priority() {
        assert_eq!(syslog_priority(&Level::ERROR), libc::LOG_ERR);
        assert_eq!(syslog_priority(&Level::WARN), libc::LOG_WARNING);
        assert_eq!(syslog_priority(&Level::INFO), libc::LOG_INFO);
        assert_eq!(syslog_priority(&Level::DEBUG), libc::LOG_DEBUG);
        assert_eq!(syslog_priority(&Level::TRACE), libc::LOG_DEBUG);
    }

    #[test]
    fn test_syslog_format_is_nul_terminated() {
        assert_eq!(SYSLOG_FORMAT.last(), Some(&0));
    }

    struct CaptureLayer(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = LineVisitor::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.into_line());
        }
    }

    #[test]
    fn test_line_visitor_renders_message_then_fields() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(lines.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "alice", position = 4, "Access granted");
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "Access granted user=alice position=4");
    }

    #[test]
    #[serial]
    fn test_init_is_idempotent() {
        init_module(false);
        init_module(true);
        init_cli(true);
        tracing::debug!("still alive");
    }
}
