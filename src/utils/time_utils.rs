use chrono::DateTime;

pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The wire sends milliseconds; the chart engine works in seconds.
pub fn epoch_ms_to_sec(epoch_ms: i64) -> i64 {
    epoch_ms / 1000
}

/// Display formatting for log lines and tooltips.
pub fn epoch_sec_to_utc(epoch_sec: i64) -> String {
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}
