//! Timestamp utilities

use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Lower bound on release date for a run started at `now`
///
/// `None` when the result falls outside chrono's representable range.
pub fn release_cutoff(now: DateTime<Utc>, lookback_days: u32) -> Option<DateTime<Utc>> {
    ChronoDuration::try_days(i64::from(lookback_days))
        .and_then(|lookback| now.checked_sub_signed(lookback))
}

/// RFC 3339 form used in `minPremiereDate` query parameters
pub fn to_rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// RFC 1123 form used in the run banner
pub fn to_rfc1123(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}
