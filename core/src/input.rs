use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Coerces form input to a non-negative count the way a lenient number field
/// does: the leading integer is used, anything unparseable or negative is 0.
pub fn parse_count(input: &str) -> u32 {
    let input = input.trim();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end].parse().unwrap_or(u32::MAX)
}

/// Validates a performance date key and returns it in canonical YYYY-MM-DD form.
pub fn normalize_date(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::validation("Date is required"));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD", input)))
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| !key.is_empty() && c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(Error::validation(format!("Unknown key: '{}'", key))),
        _ => Err(Error::validation(format!(
            "Ambiguous key: '{}' matches {:?}",
            key, matches
        ))),
    }
}
