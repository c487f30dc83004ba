use chrono::{DateTime, Duration, NaiveTime, TimeZone};

/// Formats an elapsed duration as `HH:MM:SS`. Hours keep growing past a day.
pub fn format_elapsed(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 60 / 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Whole minutes of a millisecond duration, rounded half up.
pub fn rounded_minutes(duration_ms: i64) -> i64 {
    (duration_ms as f64 / 1000. / 60.).round() as i64
}

/// Short human readable duration used in listings, e.g. `1h5m0s`.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    let next = date + Duration::days(1);
    next.with_time(NaiveTime::MIN).single().unwrap_or(next)
}
