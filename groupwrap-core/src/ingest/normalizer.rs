//! Per-convention line normalization
//!
//! Both export layouts share one driver, [`normalize_lines`]. A convention
//! only decides what each line is; the rewrite is the same for both:
//! `[<canonical timestamp>]` followed by the rest of the header untouched.

use super::timestamp::{format_canonical, parse_flexible};
use crate::error::Result;
use crate::types::Convention;
use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.+?)\]").expect("bracketed header pattern"));

static SEPARATOR_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.{3,100}?) - (.*)").expect("separator header pattern"));

/// What a single cleaned line is, according to one convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Continuation of the previous message; kept verbatim
    Continuation,
    /// Notification such as "Alice joined"; dropped
    System,
    /// Message header
    Header {
        /// Timestamp candidate, still in the export's locale format
        timestamp: &'a str,
        /// Everything that follows the canonical `[...]`, including the
        /// leading space
        rest: &'a str,
    },
}

/// Line classification strategy for one export convention.
pub trait ExportConvention: Send + Sync {
    /// Which convention this strategy handles
    fn convention(&self) -> Convention;

    /// Classify one cleaned line.
    fn classify<'a>(&self, line: &'a str) -> LineClass<'a>;
}

/// `[6.09.25, 15:00:00] Alice: hi`
#[derive(Debug, Default, Clone, Copy)]
pub struct BracketedConvention;

impl ExportConvention for BracketedConvention {
    fn convention(&self) -> Convention {
        Convention::Bracketed
    }

    fn classify<'a>(&self, line: &'a str) -> LineClass<'a> {
        let Some(caps) = BRACKETED_HEADER.captures(line) else {
            return LineClass::Continuation;
        };
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            return LineClass::Continuation;
        };

        LineClass::Header {
            timestamp: inner.as_str(),
            rest: &line[whole.end()..],
        }
    }
}

/// `06/09/2025, 15:00 - Alice: hi`
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixSeparatorConvention;

impl ExportConvention for PrefixSeparatorConvention {
    fn convention(&self) -> Convention {
        Convention::PrefixSeparator
    }

    fn classify<'a>(&self, line: &'a str) -> LineClass<'a> {
        let Some(caps) = SEPARATOR_HEADER.captures(line) else {
            return LineClass::Continuation;
        };
        let (Some(prefix), Some(remainder)) = (caps.get(1), caps.get(2)) else {
            return LineClass::Continuation;
        };

        // "Alice joined using this group's invite link" has no sender
        if !remainder.as_str().contains(':') {
            return LineClass::System;
        }

        let prefix = prefix.as_str();
        LineClass::Header {
            timestamp: prefix.strip_suffix(" - ").unwrap_or(prefix),
            // Keep the space in front of the remainder so the header reads
            // `[ts] Alice: hi`
            rest: &line[remainder.start() - 1..],
        }
    }
}

/// Get the strategy for a detected convention.
pub fn convention_for(convention: Convention) -> Box<dyn ExportConvention> {
    match convention {
        Convention::Bracketed => Box::new(BracketedConvention),
        Convention::PrefixSeparator => Box::new(PrefixSeparatorConvention),
    }
}

/// Rewrite every header of `lines` to the canonical timestamp form.
///
/// Continuations pass through, system lines are dropped. The first header
/// whose timestamp cannot be parsed aborts the whole run with
/// [`Error::UnrecognizedTimestamp`](crate::Error::UnrecognizedTimestamp).
pub fn normalize_lines(convention: &dyn ExportConvention, lines: &[String]) -> Result<Vec<String>> {
    let mut normalized = Vec::with_capacity(lines.len());
    let mut system_lines = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        match convention.classify(line) {
            LineClass::Continuation => normalized.push(line.clone()),
            LineClass::System => system_lines += 1,
            LineClass::Header { timestamp, rest } => {
                let instant = parse_flexible(timestamp).map_err(|e| {
                    tracing::warn!(
                        convention = %convention.convention(),
                        line_number = idx + 1,
                        line = %line,
                        "Unparseable message timestamp"
                    );
                    e
                })?;
                normalized.push(format!("[{}]{}", format_canonical(instant), rest));
            }
        }
    }

    tracing::debug!(
        convention = %convention.convention(),
        lines_in = lines.len(),
        lines_out = normalized.len(),
        system_lines,
        "Normalized lines"
    );

    Ok(normalized)
}
