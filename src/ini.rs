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

//! Sectioned key-value documents
//!
//! Reads the `/etc/pamfingerprint.conf` format:
//!
//! ```text
//! [Users]
//! alice = 0,5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8
//!
//! [PyFingerprint]
//! port = /dev/ttyUSB0
//! baudRate: 57600
//! ```
//!
//! Section names are case-sensitive, keys are not. Comments and blank lines
//! survive a load/save cycle so operators' annotations are kept.
//!
//! Hand-edited files are read leniently: a `; note` or `# note` after
//! whitespace ends a value, an indented line continues the previous value,
//! text after a header's `]` is ignored, and repeated sections are merged.

use pf_error::{FingerprintError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Blank line or comment, kept verbatim
    Raw(String),
    Section(String),
    Entry { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    lines: Vec<Line>,
}

fn keys_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Cut a trailing comment that follows whitespace
fn strip_inline_comment(value: &str) -> &str {
    value
        .char_indices()
        .find(|&(i, c)| matches!(c, ';' | '#') && value[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| value[..i].trim_end())
        .unwrap_or(value)
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = Vec::new();
        let mut in_section = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                lines.push(Line::Raw(raw.to_string()));
                continue;
            }

            if raw.starts_with([' ', '\t']) {
                if let Some(Line::Entry { value, .. }) = lines.last_mut() {
                    value.push('\n');
                    value.push_str(strip_inline_comment(trimmed));
                    continue;
                }
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let close = rest.rfind(']').ok_or_else(|| FingerprintError::ConfigSyntax {
                    line: line_no,
                    reason: "section header is not closed".to_string(),
                })?;
                let name = rest[..close].trim();
                if name.is_empty() {
                    return Err(FingerprintError::ConfigSyntax {
                        line: line_no,
                        reason: "empty section name".to_string(),
                    });
                }
                lines.push(Line::Section(name.to_string()));
                in_section = true;
                continue;
            }

            if !in_section {
                return Err(FingerprintError::ConfigSyntax {
                    line: line_no,
                    reason: "entry outside of a section".to_string(),
                });
            }

            let split = trimmed.find(['=', ':']).ok_or_else(|| FingerprintError::ConfigSyntax {
                line: line_no,
                reason: "expected 'key = value'".to_string(),
            })?;
            let key = trimmed[..split].trim();
            if key.is_empty() {
                return Err(FingerprintError::ConfigSyntax {
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }
            let value = strip_inline_comment(trimmed[split + 1..].trim());
            lines.push(Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        Ok(Self { lines })
    }

    /// Index ranges `(header, end)` of every block named `section`
    fn section_bounds(&self, section: &str) -> Vec<(usize, usize)> {
        let mut bounds = Vec::new();
        let mut open: Option<usize> = None;
        for (idx, line) in self.lines.iter().enumerate() {
            if let Line::Section(name) = line {
                if let Some(start) = open.take() {
                    bounds.push((start, idx));
                }
                if name == section {
                    open = Some(idx);
                }
            }
        }
        if let Some(start) = open {
            bounds.push((start, self.lines.len()));
        }
        bounds
    }

    fn section_lines(&self, section: &str) -> impl DoubleEndedIterator<Item = &Line> {
        self.section_bounds(section)
            .into_iter()
            .flat_map(move |(start, end)| self.lines[start + 1..end].iter())
    }

    pub fn has_section(&self, section: &str) -> bool {
        !self.section_bounds(section).is_empty()
    }

    /// Value of `key` in `section`; the last occurrence wins
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section_lines(section).rev().find_map(|l| match l {
            Line::Entry { key: k, value } if keys_equal(k, key) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// All entries of `section` in file order
    pub fn entries(&self, section: &str) -> Vec<(&str, &str)> {
        self.section_lines(section)
            .filter_map(|l| match l {
                Line::Entry { key, value } => Some((key.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Set `key` in `section`, creating the section if needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.remove(section, key);

        let entry = Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
        };

        match self.section_bounds(section).last() {
            Some(&(start, end)) => {
                // Insert after the last entry so trailing blank lines stay between sections
                let insert_at = self.lines[start + 1..end]
                    .iter()
                    .rposition(|l| !matches!(l, Line::Raw(r) if r.trim().is_empty()))
                    .map(|offset| start + 1 + offset + 1)
                    .unwrap_or(start + 1);
                self.lines.insert(insert_at, entry);
            }
            None => {
                if !self.lines.is_empty() {
                    self.lines.push(Line::Raw(String::new()));
                }
                self.lines.push(Line::Section(section.to_string()));
                self.lines.push(entry);
            }
        }
    }

    /// Remove every occurrence of `key` in `section`
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let bounds = self.section_bounds(section);
        if bounds.is_empty() {
            return false;
        }
        let before = self.lines.len();
        let mut idx = 0;
        self.lines.retain(|l| {
            let inside = bounds.iter().any(|&(start, end)| idx > start && idx < end);
            idx += 1;
            !(inside && matches!(l, Line::Entry { key: k, .. } if keys_equal(k, key)))
        });
        self.lines.len() != before
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Raw(raw) => out.push_str(raw),
                Line::Section(name) => {
                    out.push('[');
                    out.push_str(name);
                    out.push(']');
                }
                Line::Entry { key, value } => {
                    out.push_str(key);
                    out.push_str(" = ");
                    out.push_str(&value.replace('\n', "\n    "));
                }
            }
            out.push('\n');
        }
        out
    }
}
