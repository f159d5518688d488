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

//! Characteristics digest
//!
//! Stored hashes are SHA-256 over the characteristics rendered as a bracketed
//! decimal list, e.g. `[3, 1, 87, 0]`. The rendering must stay byte-for-byte
//! identical or every enrolled user stops matching.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Render characteristics as `[b0, b1, ...]`
pub fn render_characteristics(characteristics: &[u8]) -> String {
    let mut out = String::with_capacity(characteristics.len() * 5 + 2);
    out.push('[');
    for (i, byte) in characteristics.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // Writing to a String cannot fail
        let _ = write!(out, "{}", byte);
    }
    out.push(']');
    out
}

/// Lowercase hex SHA-256 of the rendered characteristics
pub fn characteristics_hash(characteristics: &[u8]) -> String {
    let rendered = render_characteristics(characteristics);
    format!("{:x}", Sha256::digest(rendered.as_bytes()))
}

/// Exact, case-sensitive comparison that does not stop at the first difference
pub fn hashes_match(computed: &str, expected: &str) -> bool {
    let a = computed.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
