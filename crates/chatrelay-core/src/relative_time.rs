//! Human-readable relative-time labels ("3 分钟前", "an hour ago").
//!
//! The timestamp is first truncated to the start of its minute, then the
//! distance to `now` is bucketed: each unit is the rounded total duration in
//! that unit, and the first bucket whose threshold holds wins.

use serde::{Deserialize, Serialize};

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: i64 = 60_000;
/// Average month length in days over the 400-year Gregorian cycle.
const DAYS_PER_MONTH: f64 = 146_097.0 / 4_800.0;

/// Language of the relative-time label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelativeTimeLocale {
    #[serde(rename = "en")]
    En,
    #[default]
    #[serde(rename = "zh-cn")]
    ZhCn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    FewSeconds,
    Minute,
    Minutes(i64),
    Hour,
    Hours(i64),
    Day,
    Days(i64),
    Month,
    Months(i64),
    Year,
    Years(i64),
}

fn bucket(distance_ms: i64) -> Bucket {
    let ms = distance_ms.unsigned_abs() as f64;
    let seconds = (ms / MS_PER_SECOND).round() as i64;
    let minutes = (ms / (MS_PER_SECOND * 60.0)).round() as i64;
    let hours = (ms / (MS_PER_SECOND * 3_600.0)).round() as i64;
    let total_days = ms / (MS_PER_SECOND * 86_400.0);
    let days = total_days.round() as i64;
    let months = (total_days / DAYS_PER_MONTH).round() as i64;
    let years = (total_days / DAYS_PER_MONTH / 12.0).round() as i64;

    if seconds < 45 {
        Bucket::FewSeconds
    } else if minutes <= 1 {
        Bucket::Minute
    } else if minutes < 45 {
        Bucket::Minutes(minutes)
    } else if hours <= 1 {
        Bucket::Hour
    } else if hours < 22 {
        Bucket::Hours(hours)
    } else if days <= 1 {
        Bucket::Day
    } else if days < 26 {
        Bucket::Days(days)
    } else if months <= 1 {
        Bucket::Month
    } else if months < 11 {
        Bucket::Months(months)
    } else if years <= 1 {
        Bucket::Year
    } else {
        Bucket::Years(years)
    }
}

impl RelativeTimeLocale {
    fn phrase(self, bucket: Bucket) -> String {
        match self {
            Self::En => match bucket {
                Bucket::FewSeconds => "a few seconds".to_string(),
                Bucket::Minute => "a minute".to_string(),
                Bucket::Minutes(n) => format!("{} minutes", n),
                Bucket::Hour => "an hour".to_string(),
                Bucket::Hours(n) => format!("{} hours", n),
                Bucket::Day => "a day".to_string(),
                Bucket::Days(n) => format!("{} days", n),
                Bucket::Month => "a month".to_string(),
                Bucket::Months(n) => format!("{} months", n),
                Bucket::Year => "a year".to_string(),
                Bucket::Years(n) => format!("{} years", n),
            },
            Self::ZhCn => match bucket {
                Bucket::FewSeconds => "几秒".to_string(),
                Bucket::Minute => "1 分钟".to_string(),
                Bucket::Minutes(n) => format!("{} 分钟", n),
                Bucket::Hour => "1 小时".to_string(),
                Bucket::Hours(n) => format!("{} 小时", n),
                Bucket::Day => "1 天".to_string(),
                Bucket::Days(n) => format!("{} 天", n),
                Bucket::Month => "1 个月".to_string(),
                Bucket::Months(n) => format!("{} 个月", n),
                Bucket::Year => "1 年".to_string(),
                Bucket::Years(n) => format!("{} 年", n),
            },
        }
    }

    fn wrap(self, phrase: String, future: bool) -> String {
        match (self, future) {
            (Self::En, false) => format!("{} ago", phrase),
            (Self::En, true) => format!("in {}", phrase),
            (Self::ZhCn, false) => format!("{}前", phrase),
            (Self::ZhCn, true) => format!("{}后", phrase),
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Labels `timestamp_ms` relative to `now_ms` at minute granularity.
///
/// Timestamps come from peers and may be arbitrary; distances saturate at
/// the `i64` range instead of overflowing.
pub fn relative_label(timestamp_ms: i64, now_ms: i64, locale: RelativeTimeLocale) -> String {
    let minute_start = timestamp_ms.saturating_sub(timestamp_ms.rem_euclid(MS_PER_MINUTE));
    let distance = now_ms.saturating_sub(minute_start);
    locale.wrap(locale.phrase(bucket(distance)), distance < 0)
}
