//! Tick timestamps
//!
//! Record timestamps count 100-nanosecond intervals from 0001-01-01T00:00:00Z.

use chrono::{DateTime, TimeZone, Utc};

/// Ticks between 0001-01-01 and the Unix epoch
pub const TICKS_EPOCH_OFFSET: i64 = 621_355_968_000_000_000;

/// Ticks per second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert a tick count to a UTC instant, or `None` when out of range.
pub fn ticks_to_datetime(ticks: i64) -> Option<DateTime<Utc>> {
    let since_epoch = ticks.checked_sub(TICKS_EPOCH_OFFSET)?;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = since_epoch.rem_euclid(TICKS_PER_SECOND) * 100;
    DateTime::<Utc>::from_timestamp(secs, u32::try_from(nanos).ok()?)
}

/// Render a tick count for display, falling back to the raw number.
pub fn format_ticks(ticks: i64) -> String {
    match ticks_to_datetime(ticks) {
        Some(time) => format_datetime(&time),
        None => ticks.to_string(),
    }
}

/// Render any instant in UTC.
pub fn format_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    time.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
