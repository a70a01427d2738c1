use chrono::{DateTime, Datelike, Utc};

/// Short age label for list rows, measured against `now`:
/// - under a minute: "just now"
/// - under a week: "45m ago", "3h ago", "2d ago"
/// - older: "Jan 15", or "Dec 3, 2024" outside the current year
pub fn format_age(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);

    if elapsed.num_days() >= 7 {
        return if timestamp.year() == now.year() {
            timestamp.format("%b %-d").to_string()
        } else {
            timestamp.format("%b %-d, %Y").to_string()
        };
    }

    // Clock skew can put records slightly in the future
    let seconds = elapsed.num_seconds().max(0);
    match (seconds / 86_400, seconds / 3_600, seconds / 60) {
        (days, _, _) if days > 0 => format!("{}d ago", days),
        (_, hours, _) if hours > 0 => format!("{}h ago", hours),
        (_, _, minutes) if minutes > 0 => format!("{}m ago", minutes),
        _ => "just now".to_string(),
    }
}

/// Full local-style stamp for tables and exports.
pub fn format_stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_labels() {
        let now = now();
        assert_eq!(format_age(&(now - Duration::seconds(30)), &now), "just now");
        assert_eq!(format_age(&(now - Duration::minutes(45)), &now), "45m ago");
        assert_eq!(format_age(&(now - Duration::hours(3)), &now), "3h ago");
        assert_eq!(format_age(&(now - Duration::days(5)), &now), "5d ago");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let now = now();
        assert_eq!(format_age(&(now + Duration::minutes(2)), &now), "just now");
    }

    #[test]
    fn test_absolute_labels() {
        let now = now();
        assert_eq!(format_age(&(now - Duration::days(30)), &now), "May 16");
        let old = Utc.with_ymd_and_hms(2024, 12, 3, 9, 0, 0).unwrap();
        assert_eq!(format_age(&old, &now), "Dec 3, 2024");
    }

    #[test]
    fn test_format_stamp() {
        assert_eq!(format_stamp(&now()), "2025-06-15 12:00");
    }
}
