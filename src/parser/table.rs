use crate::parser::error::{ParseIssue, RowError};
use crate::parser::header::HEADER_MARKER;
use crate::types::time_series::Sample;
use chrono::NaiveDateTime;
use log::debug;

/// Accepted timestamp layouts, tried in order. The first is the documented
/// `YYYY-MM-DDThh:mm:ss`; `%.f` also accepts fractional seconds.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Column names recognized as the measurement column.
const VALUE_COLUMNS: [&str; 4] = ["height", "value", "water_level", "waterlevel"];

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('Z');
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Rows of the data table together with the problems found on the way.
pub(crate) struct Table {
    pub samples: Vec<Sample>,
    pub issues: Vec<ParseIssue>,
}

/// Parses the data section of a station file.
///
/// `lines` starts right after the header; `first_line` is the 1-based line
/// number of `lines[0]` in the file, used in issue reports. Blank lines and
/// further `#` comment lines are skipped. The first remaining line is taken
/// as the column row unless it already parses as data.
pub(crate) fn read_table(lines: &[&str], first_line: usize) -> Table {
    let mut samples = Vec::new();
    let mut issues = Vec::new();
    let mut value_idx = 1;
    let mut seen_first = false;

    for (offset, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(HEADER_MARKER) {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if !seen_first {
            seen_first = true;
            if is_column_row(&fields) {
                value_idx = value_column(&fields).unwrap_or(1);
                continue;
            }
        }

        match parse_row(&fields, value_idx) {
            Ok(sample) => samples.push(sample),
            Err(reason) => {
                let line = first_line + offset;
                debug!("Dropping line {}: {}", line, reason);
                issues.push(ParseIssue::MalformedRow { line, reason });
            }
        }
    }

    Table { samples, issues }
}

/// A column row names the value column, or at least carries neither a
/// timestamp nor a numeric value.
fn is_column_row(fields: &[&str]) -> bool {
    if value_column(fields).is_some() {
        return true;
    }
    let numeric = fields.get(1).is_some_and(|v| v.parse::<f64>().is_ok());
    parse_timestamp(fields[0]).is_none() && !numeric
}

fn value_column(columns: &[&str]) -> Option<usize> {
    columns.iter().position(|c| {
        let name = c.to_ascii_lowercase().replace(' ', "_");
        VALUE_COLUMNS.contains(&name.as_str())
    })
}

fn parse_row(fields: &[&str], value_idx: usize) -> Result<Sample, RowError> {
    let raw_value = fields
        .get(value_idx)
        .filter(|v| !v.is_empty())
        .ok_or(RowError::MissingValue)?;
    let datetime = parse_timestamp(fields[0])
        .ok_or_else(|| RowError::InvalidTimestamp(fields[0].to_string()))?;
    let value = raw_value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidValue(raw_value.to_string()))?;
    Ok(Sample { datetime, value })
}
