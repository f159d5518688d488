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

//! Optional JSON-lines audit trail of authentication attempts

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use pf_error::{FingerprintError, Result};
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::Report;

lazy_static! {
    // One writer at a time inside this process; O_APPEND covers other processes.
    static ref AUDIT_LOCK: Mutex<()> = Mutex::new(());
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Append one `{"ts_ms", "event", "data"}` line to `path`
pub fn append_event(path: &Path, event: &str, data: Value) -> Result<()> {
    let line = serde_json::to_string(&json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    }))?;

    let _guard = AUDIT_LOCK
        .lock()
        .map_err(|_| FingerprintError::generic("audit lock poisoned"))?;
    let write_err = |source| FingerprintError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
        .map_err(write_err)?;
    writeln!(file, "{}", line).map_err(write_err)
}

/// Record an attempt; failures are logged and otherwise ignored
pub fn record(path: &Path, report: &Report) {
    let result = serde_json::to_value(report)
        .map_err(FingerprintError::from)
        .and_then(|data| append_event(path, "authenticate", data));
    if let Err(e) = result {
        warn!(path = %path.display(), "Could not write audit record: {}", e);
    }
}
