use chrono::{DateTime, Utc};
use serde::Serialize;

/// Totals over every cached blob
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_files: usize,
    pub total_bytes: u64,
    pub oldest_cached_at: Option<DateTime<Utc>>,
}

/// Human readable size: `0 B`, `512 B`, `1.5 KB`, `3 MB`.
///
/// One decimal at most, trailing `.0` dropped, GB is the largest unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0} {}", rounded, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}
