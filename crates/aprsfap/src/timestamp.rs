//! APRS timestamp resolution
//!
//! APRS timestamps are seven characters: six digits and a
//! one-character format indicator. They never carry a year, and
//! day-hour-minute stamps carry no month. The decoder resolves
//! them against a reference "now" which the caller supplies.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use lazy_static::lazy_static;
use regex::Regex;

/// A report timestamp
///
/// Resolved timestamps are absolute instants in UTC. If the
/// decoder is configured with
/// [`with_raw_timestamp()`](crate::ParserOptions::with_raw_timestamp),
/// the six digits are returned verbatim instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Timestamp {
    /// An absolute time
    Resolved(DateTime<Utc>),

    /// The six digits of the timestamp, unresolved
    Raw(String),
}

impl Timestamp {
    /// The resolved time, if any
    pub fn datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Timestamp::Resolved(dt) => Some(dt),
            Timestamp::Raw(_) => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Resolved(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").fmt(f),
            Timestamp::Raw(digits) => digits.fmt(f),
        }
    }
}

// HMS stamps more than this far in the future belong to yesterday
const HMS_FUTURE_SLACK_SECS: i64 = 3900;

// HMS stamps more than this far in the past belong to tomorrow
const HMS_PAST_SLACK_SECS: i64 = 82500;

// DHM candidates less than this far ahead of now are accepted
const DHM_FUTURE_LIMIT_SECS: i64 = 43400;

/// Resolve a seven-character APRS timestamp
///
/// Formats are `DDHHMMz` (day/hour/minute, UTC), `DDHHMM/`
/// (day/hour/minute, local time) and `HHMMSSh` (hour/minute/second,
/// UTC). Returns `None` if the stamp is malformed or names an
/// impossible time.
pub(crate) fn parse_timestamp(stamp: &str, raw: bool, now: &DateTime<Utc>) -> Option<Timestamp> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^(\d{2})(\d{2})(\d{2})(z|h|/)$").expect("bad timestamp regexp");
    }

    let caps = RE.captures(stamp)?;
    if raw {
        return Some(Timestamp::Raw(stamp[0..6].to_owned()));
    }

    let d1: u32 = caps[1].parse().ok()?;
    let d2: u32 = caps[2].parse().ok()?;
    let d3: u32 = caps[3].parse().ok()?;
    let resolved = match &caps[4] {
        "h" => resolve_hms(d1, d2, d3, now),
        "z" => resolve_dhm(d1, d2, d3, now, false),
        _ => resolve_dhm(d1, d2, d3, now, true),
    }?;
    Some(Timestamp::Resolved(resolved))
}

// Hour-minute-second: today, unless that is too far from now
fn resolve_hms(hour: u32, minute: u32, second: u32, now: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let stamp = now
        .date_naive()
        .and_hms_opt(hour, minute, second)
        .map(|naive| Utc.from_utc_datetime(&naive))?;

    if *now + Duration::seconds(HMS_FUTURE_SLACK_SECS) < stamp {
        Some(stamp - Duration::days(1))
    } else if *now - Duration::seconds(HMS_PAST_SLACK_SECS) > stamp {
        Some(stamp + Duration::days(1))
    } else {
        Some(stamp)
    }
}

// Day-hour-minute: pick a month so the stamp lands near now
fn resolve_dhm(
    day: u32,
    hour: u32,
    minute: u32,
    now: &DateTime<Utc>,
    local: bool,
) -> Option<DateTime<Utc>> {
    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return None;
    }

    let (year, month) = if local {
        let here = now.with_timezone(&Local);
        (here.year(), here.month())
    } else {
        (now.year(), now.month())
    };

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };

    let candidate = |y: i32, m: u32| -> Option<DateTime<Utc>> {
        let naive = NaiveDate::from_ymd_opt(y, m, day)?.and_hms_opt(hour, minute, 0)?;
        to_utc(&naive, local)
    };
    let near_enough = |dt: &DateTime<Utc>| (*dt - *now).num_seconds() < DHM_FUTURE_LIMIT_SECS;

    candidate(next_year, next_month)
        .filter(near_enough)
        .or_else(|| candidate(year, month).filter(near_enough))
        .or_else(|| candidate(prev_year, prev_month))
}

fn to_utc(naive: &NaiveDateTime, local: bool) -> Option<DateTime<Utc>> {
    if local {
        Local
            .from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        Some(Utc.from_utc_datetime(naive))
    }
}

/// Format a timestamp for transmission
///
/// Reports less than 23.5 hours old use `HHMMSSh`; older reports
/// use `DDHHMMz`.
pub(crate) fn format_timestamp(stamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let age = *now - *stamp;
    if age < Duration::minutes(23 * 60 + 30) {
        format!(
            "{:02}{:02}{:02}h",
            stamp.hour(),
            stamp.minute(),
            stamp.second()
        )
    } else {
        format!("{:02}{:02}{:02}z", stamp.day(), stamp.hour(), stamp.minute())
    }
}
