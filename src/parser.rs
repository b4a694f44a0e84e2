use crate::error::LineError;
use crate::models::ParsedLine;
use regex::Regex;
use std::sync::LazyLock;

// Unicode decimal digits (Nd). Superscripts and circled numbers do not match.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

const TABLE_HEADER: &str = "School District EMIS";
const COLUMN_HEADER_PREFIX: &str = "SN";
const REPORT_TITLE: &str = "Government Secondary Schools";

/// Minimum tokens in a data row: serial number, one name word, district.
const MIN_ROW_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    TableHeader,
    ColumnHeader,
    ReportTitle,
    /// Too few tokens or no leading serial number (wrapped names, page artifacts).
    NotARow,
    EmptyField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Skip(SkipReason),
    Record(ParsedLine),
}

pub fn is_numeric_token(token: &str) -> bool {
    DIGITS_RE.is_match(token)
}

/// Header, title and blank lines. Checked before any tokenizing.
pub fn classify_noise(line: &str) -> Option<SkipReason> {
    if line.trim().is_empty() {
        return Some(SkipReason::Blank);
    }
    if line.contains(TABLE_HEADER) {
        return Some(SkipReason::TableHeader);
    }
    if line.trim_start().starts_with(COLUMN_HEADER_PREFIX) {
        return Some(SkipReason::ColumnHeader);
    }
    if line.contains(REPORT_TITLE) {
        return Some(SkipReason::ReportTitle);
    }
    None
}

/// Parse one line of the listing.
///
/// Rows look like `SN NAME... DISTRICT [EMIS]`. A trailing all-digit token
/// is always taken as the EMIS code, so a numeric district would be read as
/// a code. The district is always a single token; multi-word districts end
/// up with their leading words appended to the school name.
pub fn parse_line(line: &str) -> Result<LineOutcome, LineError> {
    if let Some(reason) = classify_noise(line) {
        return Ok(LineOutcome::Skip(reason));
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_ROW_TOKENS || !is_numeric_token(parts[0]) {
        return Ok(LineOutcome::Skip(SkipReason::NotARow));
    }

    let last = token_at(&parts, parts.len() - 1)?;
    let (district, code, name_end) = if is_numeric_token(last) {
        let district = token_at(&parts, parts.len() - 2)?;
        (district, last, parts.len() - 2)
    } else {
        (last, "", parts.len() - 1)
    };

    let name = parts
        .get(1..name_end)
        .ok_or(LineError::BadNameSpan {
            start: 1,
            end: name_end,
            len: parts.len(),
        })?
        .join(" ");

    if name.is_empty() || district.is_empty() {
        return Ok(LineOutcome::Skip(SkipReason::EmptyField));
    }

    Ok(LineOutcome::Record(ParsedLine {
        name,
        district: district.to_string(),
        code: code.to_string(),
    }))
}

fn token_at<'a>(parts: &[&'a str], index: usize) -> Result<&'a str, LineError> {
    parts.get(index).copied().ok_or(LineError::MissingToken {
        index,
        len: parts.len(),
    })
}
