//! Human-readable formatting of sizes and dates.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Decimal (1000-based) size with two decimals, e.g. `1.50 MB`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// Format an RFC 3339 timestamp with a strftime pattern. Unparseable input is
/// returned unchanged.
pub fn format_date(timestamp: &str, pattern: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc).format(pattern).to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Date as shown in image summaries.
pub fn format_created(timestamp: &str) -> String {
    format_date(timestamp, "%Y/%m/%d")
}

/// Strip the URL scheme, for `docker pull` lines.
pub fn strip_scheme(endpoint: &str) -> &str {
    let trimmed = endpoint.trim_end_matches('/');
    trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed)
}
