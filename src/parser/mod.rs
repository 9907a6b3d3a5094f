//! Parser for the GNSS-IR station text format.
//!
//! ```text
//! # Station: cam4
//! # Latitude: 4.05
//! # Longitude: 9.70
//! # Units: m
//! #
//! DateTime,Height
//! 2025-06-01T18:50:18,47.531
//! ```
//!
//! Parsing never fails as a whole. Problems are collected as
//! [`ParseIssue`]s on the result: missing header fields leave coordinates
//! unset, malformed rows are dropped, and a file without valid rows yields an
//! empty series.

pub mod error;
pub mod header;
mod table;

pub use error::{ParseIssue, RowError, REQUIRED_FIELDS};
pub use header::Header;

use crate::types::station::StationMeta;
use crate::types::time_series::TimeSeries;
use header::read_header;
use table::read_table;

/// Everything extracted from one station file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedStation {
    pub meta: StationMeta,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub series: TimeSeries,
    pub issues: Vec<ParseIssue>,
}

impl ParsedStation {
    /// Number of data rows that were dropped.
    pub fn malformed_rows(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, ParseIssue::MalformedRow { .. }))
            .count()
    }

    /// Required header fields absent from the file.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                ParseIssue::MissingHeader { field } => Some(*field),
                _ => None,
            })
            .collect()
    }
}

fn split_lines(raw: &str) -> Vec<&str> {
    raw.trim_start_matches('\u{feff}').lines().collect()
}

/// Parses the metadata header only, ignoring anything after it. Used for
/// discovery, where the body may be a truncated prefix of the file.
pub fn parse_header(raw: &str) -> Header {
    let lines = split_lines(raw);
    read_header(&lines).0
}

/// Parses a complete station file into metadata and a sorted series.
pub fn parse_station(raw: &str) -> ParsedStation {
    let lines = split_lines(raw);
    let (header, consumed) = read_header(&lines);
    let table = read_table(&lines[consumed..], consumed + 1);

    let mut issues = header.issues;
    issues.extend(table.issues);

    ParsedStation {
        meta: header.meta,
        lat: header.lat,
        lon: header.lon,
        series: TimeSeries::from_unsorted(table.samples),
        issues,
    }
}
