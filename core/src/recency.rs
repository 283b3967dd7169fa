use std::fmt::Display;

use chrono::{DateTime, TimeZone};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Human label for how long ago `timestamp` was, relative to `now`.
///
/// Anything a week or older (and nothing in the future) gets an absolute
/// `M/D/YYYY` date in the timestamp's own time zone. Instants after `now`
/// read as "just now".
pub fn format_recency<Tz>(timestamp: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let elapsed = now.timestamp_millis() - timestamp.timestamp_millis();

    if elapsed < MINUTE_MS {
        "just now".to_string()
    } else if elapsed < HOUR_MS {
        ago(elapsed / MINUTE_MS, "minute")
    } else if elapsed < DAY_MS {
        ago(elapsed / HOUR_MS, "hour")
    } else if elapsed < WEEK_MS {
        ago(elapsed / DAY_MS, "day")
    } else {
        timestamp.format("%-m/%-d/%Y").to_string()
    }
}

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
