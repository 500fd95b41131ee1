//! Timestamp display
//!
//! Block, pool and history endpoints report Unix seconds; wallet info reports
//! values that are already display-ready. Each view picks its style.

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use crate::infrastructure::ledger::types::scalar_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// Seconds since the epoch, shown as a local date
    UnixSeconds,
    /// Shown exactly as received
    AsIs,
}

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub fn format_timestamp(value: &Value, style: TimestampStyle) -> String {
    match style {
        TimestampStyle::AsIs => scalar_display(value),
        TimestampStyle::UnixSeconds => match unix_seconds(value) {
            Some(secs) => format_unix_seconds(secs, &Local),
            None => scalar_display(value),
        },
    }
}

/// Seconds are scaled to milliseconds before conversion, as the service
/// contract requires for these endpoints.
pub fn format_unix_seconds<Tz>(secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(millis) = secs.checked_mul(1000) else {
        return secs.to_string();
    };
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => format_datetime(&dt),
        None => secs.to_string(),
    }
}

fn format_datetime<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    dt.format(DISPLAY_FORMAT).to_string()
}

fn unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
