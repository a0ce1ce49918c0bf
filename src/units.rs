//! Size and percentage string conversion for container stat records.
//!
//! The stats stream reports every metric as a human-readable display
//! string: memory as `"88KiB / 7.66GiB"`, block IO as `"4.1MB / 0B"`,
//! CPU as `"0.25%"`. Everything here normalizes those strings into plain
//! `f64` values, with sizes expressed in mebibytes.

use thiserror::Error;

/// Errors produced when a stat string cannot be normalized.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The value was empty after trimming whitespace.
    #[error("empty value")]
    Empty,

    /// The numeric portion failed to parse as a float.
    #[error("invalid numeric value {value:?}")]
    Number {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A `"read / write"` pair was missing its separator.
    #[error("missing '/' separator in {value:?}")]
    MissingSeparator { value: String },
}

/// Multipliers to mebibytes, matched longest suffix first.
///
/// Binary and decimal prefixes collapse into the same class: the stream
/// mixes `MiB` (memory) and `MB` (block IO) freely and the recorded
/// columns treat them as one unit.
const SUFFIXES: [(&str, f64); 10] = [
    ("TiB", 1024.0 * 1024.0),
    ("TB", 1024.0 * 1024.0),
    ("GiB", 1024.0),
    ("GB", 1024.0),
    ("MiB", 1.0),
    ("MB", 1.0),
    ("KiB", 1.0 / 1024.0),
    ("KB", 1.0 / 1024.0),
    ("kB", 1.0 / 1024.0),
    ("B", 1.0 / (1024.0 * 1024.0)),
];

/// Normalize a human-readable size string to mebibytes.
///
/// Accepts values like `"512MiB"`, `"1.2GB"`, `"930kB"`, `"0B"` and
/// `"88 KiB"`. A bare number is taken to already be in mebibytes.
pub fn parse_size(s: &str) -> Result<f64, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    let (number, multiplier) = SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| s.strip_suffix(suffix).map(|rest| (rest, *multiplier)))
        .unwrap_or((s, 1.0));

    let number = number.trim();
    if number.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: f64 = number.parse().map_err(|source| ParseError::Number {
        value: s.to_string(),
        source,
    })?;
    Ok(value * multiplier)
}

/// Parse a percentage string such as `"12.34%"`. The `%` is optional.
pub fn parse_percent(s: &str) -> Result<f64, ParseError> {
    let s = s.trim();
    let number = s.strip_suffix('%').unwrap_or(s).trim();
    if number.is_empty() {
        return Err(ParseError::Empty);
    }

    number.parse().map_err(|source| ParseError::Number {
        value: s.to_string(),
        source,
    })
}

/// The usage side of a `"usage / limit"` string, trimmed.
///
/// Strings without a separator are returned whole; the limit side is
/// never recorded.
pub fn usage_part(s: &str) -> &str {
    match s.split_once('/') {
        Some((usage, _)) => usage.trim(),
        None => s.trim(),
    }
}

/// Both sides of a `"read / write"` pair, trimmed.
pub fn split_pair(s: &str) -> Result<(&str, &str), ParseError> {
    s.split_once('/')
        .map(|(left, right)| (left.trim(), right.trim()))
        .ok_or_else(|| ParseError::MissingSeparator {
            value: s.to_string(),
        })
}
