//! ISO week buckets.
//!
//! Stories, sprints, and leave entries are partitioned by a `YYYY-Www`
//! string (e.g. `2026-W08`). The string form is the storage and wire
//! format; this module is the one place that parses it.

use chrono::{Datelike, Utc};

/// Format a (year, week-of-year) pair as `YYYY-Www`.
pub fn format_week(year: i32, week: u32) -> String {
    format!("{year}-W{week:02}")
}

/// The current ISO week bucket.
pub fn current_week() -> String {
    let iso = Utc::now().iso_week();
    format_week(iso.year(), iso.week())
}

/// Parse a `YYYY-Www` bucket into (year, week). Returns None for anything
/// that doesn't match the shape or has a week outside 1..=53.
pub fn parse_week(s: &str) -> Option<(i32, u32)> {
    let (year_part, week_part) = s.split_once("-W")?;
    if year_part.len() != 4 || week_part.len() != 2 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let week: u32 = week_part.parse().ok()?;
    if !(1..=53).contains(&week) {
        return None;
    }
    Some((year, week))
}
