use std::fmt;
use thiserror::Error;

/// Header fields every station file is expected to carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["station", "latitude", "longitude"];

/// A non-fatal problem found while parsing a station file.
///
/// None of these stop the parse: a station with a missing header field is
/// still registered, a malformed row is dropped and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIssue {
    #[error("Required header field '{field}' is missing")]
    MissingHeader { field: &'static str },

    #[error("Header field '{field}' has invalid coordinate '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("Line {line}: {reason}")]
    MalformedRow { line: usize, reason: RowError },
}

/// Why a data row was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RowError {
    MissingValue,
    InvalidTimestamp(String),
    InvalidValue(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingValue => write!(f, "expected '<DateTime>,<Value>'"),
            RowError::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{raw}'"),
            RowError::InvalidValue(raw) => write!(f, "invalid value '{raw}'"),
        }
    }
}
