use chrono::{Local, NaiveDate, TimeZone};

/// Display format used for all normalized timestamps.
const DISPLAY_FORMAT: &str = "%m-%d-%Y -- %H:%M:%S";

/// Format a portal timestamp as `MM-DD-YYYY -- HH:MM:SS` in local time.
///
/// Portal timestamps are epoch milliseconds; sub-second precision is
/// truncated. Values outside chrono's representable range format as an
/// empty string.
pub fn format_timestamp(epoch_ms: i64) -> String {
    let secs = epoch_ms.div_euclid(1000);
    Local
        .timestamp_opt(secs, 0)
        .earliest()
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Whole days elapsed between a display-formatted date and today.
///
/// Returns `None` when the string does not start with a parseable
/// `MM-DD-YYYY` prefix.
pub fn age_in_days(display_date: &str) -> Option<i64> {
    let date_part = display_date.get(..10)?;
    let date = NaiveDate::parse_from_str(date_part, "%m-%d-%Y").ok()?;
    Some((Local::now().date_naive() - date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn format_timestamp_matches_display_shape() {
        // 2019-09-24T14:00:00Z in milliseconds
        let formatted = format_timestamp(1_569_333_600_000);

        let (date_part, time_part) = formatted
            .split_once(" -- ")
            .expect("separator should be present");
        assert!(NaiveDate::parse_from_str(date_part, "%m-%d-%Y").is_ok());
        assert!(chrono::NaiveTime::parse_from_str(time_part, "%H:%M:%S").is_ok());
    }

    #[test]
    fn format_timestamp_truncates_milliseconds() {
        assert_eq!(
            format_timestamp(1_569_333_600_999),
            format_timestamp(1_569_333_600_000)
        );
    }

    #[test]
    fn age_in_days_counts_from_display_date() {
        let three_days_ago = Local::now() - Duration::days(3);
        let display = three_days_ago.format("%m-%d-%Y -- %H:%M:%S").to_string();
        assert_eq!(age_in_days(&display), Some(3));
    }

    #[test]
    fn age_in_days_rejects_unparseable_input() {
        assert_eq!(age_in_days("not a date"), None);
        assert_eq!(age_in_days(""), None);
    }
}
