//! Ingestion layer for raw chat exports
//!
//! Turns the text of an export into canonical lines:
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌─────────────────┐   ┌─────────────────┐
//! │  raw text  │──►│ clean_lines  │──►│detect_convention│──►│ normalize_lines │
//! └────────────┘   └──────────────┘   └─────────────────┘   └─────────────────┘
//!                                                                    │
//!                                                                    ▼
//!                                                   parse_flexible (per header)
//! ```
//!
//! Every message header comes out as `[DD.MM.YY, HH:MM:SS] Sender: text`
//! whatever convention it arrived in. A header whose timestamp cannot be
//! parsed fails the whole export.
//!
//! ## Usage
//!
//! ```rust
//! use groupwrap_core::ingest::ingest;
//! use groupwrap_core::Convention;
//!
//! let export = ingest("[6.09.25, 15:00:00] Alice: hi\n").unwrap();
//! assert_eq!(export.convention, Convention::Bracketed);
//! assert_eq!(export.lines, vec!["[06.09.25, 15:00:00] Alice: hi".to_string()]);
//! ```

mod normalizer;
pub mod timestamp;

pub use normalizer::{
    convention_for, normalize_lines, BracketedConvention, ExportConvention, LineClass,
    PrefixSeparatorConvention,
};
pub use timestamp::{format_canonical, parse_flexible, CANONICAL_FORMAT};

use crate::error::{Error, Result};
use crate::types::Convention;

/// Left-to-right mark and narrow no-break space, sprinkled through exports
const INVISIBLE_MARKS: &[char] = &['\u{200e}', '\u{202f}'];

/// Result of ingesting one export.
#[derive(Debug, Clone)]
pub struct IngestedExport {
    /// Detected line convention
    pub convention: Convention,
    /// Canonical lines, in transcript order
    pub lines: Vec<String>,
}

/// Split raw text into trimmed lines without invisible marks, dropping blanks.
pub fn clean_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|row| row.trim().replace(INVISIBLE_MARKS, ""))
        .filter(|row| !row.is_empty())
        .collect()
}

/// Classify cleaned lines by looking at the first one.
pub fn detect_convention(lines: &[String]) -> Result<Convention> {
    let first = lines.first().ok_or(Error::EmptyInput)?;

    if first.contains('[') && first.contains(']') {
        Ok(Convention::Bracketed)
    } else {
        Ok(Convention::PrefixSeparator)
    }
}

/// Clean, classify and normalize a raw export.
pub fn ingest(content: &str) -> Result<IngestedExport> {
    let cleaned = clean_lines(content);
    let convention = detect_convention(&cleaned)?;

    tracing::info!(
        convention = %convention,
        lines = cleaned.len(),
        "Detected export convention"
    );

    let lines = normalize_lines(convention_for(convention).as_ref(), &cleaned)?;

    Ok(IngestedExport { convention, lines })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lines_strips_marks_and_blanks() {
        let raw = "  \u{200e}[6.09.25, 3:00:00\u{202f}PM] Alice: hi \r\n\n   \nsecond\r\n";
        assert_eq!(
            clean_lines(raw),
            vec!["[6.09.25, 3:00:00PM] Alice: hi".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_detect_convention() {
        let ios = vec!["[6.09.25, 15:00:00] Alice: hi".to_string()];
        let android = vec!["06/09/2025, 15:00 - Alice: hi".to_string()];
        assert_eq!(detect_convention(&ios).unwrap(), Convention::Bracketed);
        assert_eq!(detect_convention(&android).unwrap(), Convention::PrefixSeparator);
    }

    #[test]
    fn test_detect_convention_needs_both_brackets() {
        let lines = vec!["[unbalanced - Alice: hi".to_string()];
        assert_eq!(detect_convention(&lines).unwrap(), Convention::PrefixSeparator);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(detect_convention(&[]), Err(Error::EmptyInput)));
        assert!(matches!(ingest("\n  \n\u{200e}\n"), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let raw = "06/09/2025, 15:00:00 - Alice: hi\nmore\n9/7/25, 1:02:03 PM - Bob: back\n";
        let first = ingest(raw).unwrap();
        assert_eq!(first.convention, Convention::PrefixSeparator);

        let second = ingest(&first.lines.join("\n")).unwrap();
        assert_eq!(second.convention, Convention::Bracketed);
        assert_eq!(second.lines, first.lines);
    }
}
