//! Relative Timestamps
//!
//! "3 minutes ago" style distances, bucketed the way date-fns
//! `formatDistanceToNow(.., { addSuffix: true })` buckets them.

use chrono::{DateTime, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn round_div(value: i64, by: i64) -> i64 {
    (value as f64 / by as f64).round() as i64
}

/// Distance from `then` to `now` without suffix; future times count as zero
pub fn distance(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = round_div(seconds, 60);

    if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        format!("about {}", plural(round_div(minutes, 60), "hour"))
    } else if minutes < 2_520 {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        plural(round_div(minutes, MINUTES_IN_DAY), "day")
    } else if minutes < 2 * MINUTES_IN_MONTH {
        format!("about {}", plural(round_div(minutes, MINUTES_IN_MONTH), "month"))
    } else {
        let months = minutes / MINUTES_IN_MONTH;
        if months < 12 {
            return plural(round_div(minutes, MINUTES_IN_MONTH), "month");
        }
        let years = months / 12;
        match months % 12 {
            0..=2 => format!("about {}", plural(years, "year")),
            3..=8 => format!("over {}", plural(years, "year")),
            _ => format!("almost {}", plural(years + 1, "year")),
        }
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} ago", distance(then, now))
}

/// Relative to the current wall clock
pub fn time_ago_now(then: DateTime<Utc>) -> String {
    time_ago(then, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(d: Duration) -> String {
        let now = Utc::now();
        time_ago(now - d, now)
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(ago(Duration::seconds(10)), "less than a minute ago");
        assert_eq!(ago(Duration::seconds(45)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(3)), "3 minutes ago");
        assert_eq!(ago(Duration::minutes(60)), "about 1 hour ago");
        assert_eq!(ago(Duration::hours(5)), "about 5 hours ago");
    }

    #[test]
    fn test_days_and_months() {
        assert_eq!(ago(Duration::hours(30)), "1 day ago");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
        assert_eq!(ago(Duration::days(40)), "about 1 month ago");
        assert_eq!(ago(Duration::days(150)), "5 months ago");
    }

    #[test]
    fn test_years() {
        assert_eq!(ago(Duration::days(370)), "about 1 year ago");
        assert_eq!(ago(Duration::days(365 + 180)), "over 1 year ago");
        assert_eq!(ago(Duration::days(365 + 330)), "almost 2 years ago");
    }

    #[test]
    fn test_future_clamps_to_now() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::minutes(5), now), "less than a minute ago");
    }
}
