use crate::parser::error::{ParseIssue, REQUIRED_FIELDS};
use crate::types::station::StationMeta;

/// Marker starting every header line.
pub const HEADER_MARKER: char = '#';

/// Metadata block at the top of a station file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub meta: StationMeta,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub issues: Vec<ParseIssue>,
}

/// Reads the leading `# Key: Value` lines of `lines`.
///
/// The header ends at the first line not starting with `#`, or right after a
/// bare `#` line. Marker lines without a `:` are treated as comments. Returns
/// the header and the number of lines it consumed.
pub(crate) fn read_header(lines: &[&str]) -> (Header, usize) {
    let mut meta = StationMeta::new();
    let mut consumed = 0;

    for line in lines {
        let Some(content) = line.trim().strip_prefix(HEADER_MARKER) else {
            break;
        };
        consumed += 1;

        let content = content.trim();
        if content.is_empty() {
            break;
        }
        if let Some((key, value)) = content.split_once(':') {
            if !key.trim().is_empty() {
                meta.insert(key, value.trim());
            }
        }
    }

    (Header::from_meta(meta), consumed)
}

impl Header {
    /// Derives coordinates from `meta` and records missing or invalid
    /// required fields.
    pub(crate) fn from_meta(meta: StationMeta) -> Self {
        let mut issues: Vec<ParseIssue> = REQUIRED_FIELDS
            .into_iter()
            .filter(|field| !meta.contains(field))
            .map(|field| ParseIssue::MissingHeader { field })
            .collect();

        let lat = coordinate(&meta, "latitude", 90.0, &mut issues);
        let lon = coordinate(&meta, "longitude", 180.0, &mut issues);

        Header {
            meta,
            lat,
            lon,
            issues,
        }
    }
}

/// Parses a decimal-degree field, rejecting values outside `±limit`.
fn coordinate(
    meta: &StationMeta,
    field: &'static str,
    limit: f64,
    issues: &mut Vec<ParseIssue>,
) -> Option<f64> {
    let raw = meta.get(field)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Some(value),
        _ => {
            issues.push(ParseIssue::InvalidCoordinate {
                field,
                value: raw.to_string(),
            });
            None
        }
    }
}
