//! `last_updated` formatting.

use chrono::{Local, NaiveDateTime};

const ISO_LOCAL: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// ISO-8601 local time with microseconds and no offset, e.g.
/// `2024-03-01T09:15:02.120034`.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(ISO_LOCAL).to_string()
}

/// The current wall-clock time in the format stored as `last_updated`.
pub fn now_timestamp() -> String {
    format_timestamp(Local::now().naive_local())
}
