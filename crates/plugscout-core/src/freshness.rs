// "Is this new?" - evaluated at render time, never cached, since now keeps moving
use chrono::{DateTime, Duration, Utc};

/// Plugins younger than this get the "new" badge
pub const NEW_PLUGIN_DAYS: i64 = 1;

/// Trailing window of the updates feed
pub const UPDATES_WINDOW_DAYS: i64 = 10;

/// True iff `timestamp` is less than `threshold_days` old right now
pub fn is_recent(timestamp: DateTime<Utc>, threshold_days: i64) -> bool {
    is_recent_at(timestamp, threshold_days, Utc::now())
}

/// True iff `now - timestamp < threshold_days`
///
/// The bound is exclusive: something exactly `threshold_days` old is not
/// recent. Timestamps in the future always count as recent.
pub fn is_recent_at(timestamp: DateTime<Utc>, threshold_days: i64, now: DateTime<Utc>) -> bool {
    match Duration::try_days(threshold_days) {
        Some(window) => now.signed_duration_since(timestamp) < window,
        // Absurdly large windows cover everything (or nothing, if negative)
        None => threshold_days > 0,
    }
}

/// Oldest instant still inside a window of `threshold_days` ending at `now`
///
/// Anything strictly after the cutoff satisfies `is_recent_at`.
pub fn cutoff(threshold_days: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    Duration::try_days(threshold_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
