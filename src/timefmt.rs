//! Pure time formatting and calendar helpers.
//!
//! All functions take timestamps (epoch ms) or minute-of-day values plus
//! an explicit reference `now_ms` where relevant — no ambient clock reads.
//! Calendar-day math uses the device-local timezone, matching how users
//! read "today" and "8:00 AM".

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};

use crate::clock::{DAY_MS, HOUR_MS, MINUTE_MS};

fn local_dt(ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(ms).single()
}

fn local_date(ms: i64) -> Option<NaiveDate> {
    local_dt(ms).map(|dt| dt.date_naive())
}

/// Zero-padded `HH:MM` from a minute-of-day value (0–1439).
pub fn format_minute_of_day(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// 12-hour `H:MM AM/PM` from a minute-of-day value.
/// 0 is "12:00 AM", 720 is "12:00 PM".
pub fn format_minute_of_day_12h(minute: u16) -> String {
    let hour24 = minute / 60;
    let min = minute % 60;
    let period = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{min:02} {period}")
}

/// Parse `HH:MM` into a minute-of-day value. `None` when malformed or
/// out of range.
pub fn minute_of_day_from_hhmm(s: &str) -> Option<u16> {
    let (h, m) = s.split_once(':')?;
    let hours: u16 = h.parse().ok()?;
    let minutes: u16 = m.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Human text for the time left until `alert_ms`, bucketed into
/// minutes, hours, then days.
pub fn time_remaining_text(alert_ms: i64, now_ms: i64) -> String {
    let diff = alert_ms - now_ms;
    if diff < 0 {
        return "Overdue".to_string();
    }

    let minutes = diff / MINUTE_MS;
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h {}min", minutes % 60);
    }

    let days = hours / 24;
    format!("{days}d {}h", hours % 24)
}

/// Descriptive text for a reminder lead time, e.g. "1 day before",
/// "2 hours before", "30 minutes before".
pub fn lead_time_note(minutes: i64) -> String {
    if minutes >= 1440 {
        let days = minutes / 1440;
        format!("{days} day{} before", if days > 1 { "s" } else { "" })
    } else if minutes >= 60 {
        let hours = minutes / 60;
        format!("{hours} hour{} before", if hours > 1 { "s" } else { "" })
    } else {
        format!("{minutes} minutes before")
    }
}

/// Whole years between a birth timestamp and `now_ms`, in local calendar
/// terms. `None` only when a timestamp is outside the representable range.
pub fn age_years(birth_ms: i64, now_ms: i64) -> Option<i32> {
    let birth = local_date(birth_ms)?;
    let today = local_date(now_ms)?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// Midnight (local) of the calendar day containing `now_ms`, shifted
/// forward by `day_offset` days.
pub fn local_day_start_ms(now_ms: i64, day_offset: u64) -> Option<i64> {
    let date = local_date(now_ms)?.checked_add_days(Days::new(day_offset))?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // earliest() tolerates DST gaps at midnight
    let dt = Local.from_local_datetime(&midnight).earliest()?;
    Some(dt.timestamp_millis())
}

/// Weekday of the local calendar day containing `ms`: 0 = Sunday .. 6 = Saturday.
pub fn local_weekday(ms: i64) -> Option<u8> {
    local_dt(ms).map(|dt| dt.weekday().num_days_from_sunday() as u8)
}

/// Same local calendar day?
pub fn same_local_day(a_ms: i64, b_ms: i64) -> bool {
    match (local_date(a_ms), local_date(b_ms)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Days until `target_ms`, rounded up; negative when the target is past.
pub fn days_until(target_ms: i64, now_ms: i64) -> i64 {
    let diff = target_ms - now_ms;
    (diff as f64 / DAY_MS as f64).ceil() as i64
}

/// Local date and 12-hour time, e.g. "2024-03-04 at 9:30 AM".
pub fn format_local_datetime(ms: i64) -> Option<String> {
    let dt = local_dt(ms)?;
    let minute = (dt.timestamp_millis() - local_day_start_ms(ms, 0)?) / MINUTE_MS;
    let time = format_minute_of_day_12h(minute.clamp(0, 1439) as u16);
    Some(format!("{} at {}", dt.format("%Y-%m-%d"), time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn minute_of_day_zero_padded() {
        assert_eq!(format_minute_of_day(0), "00:00");
        assert_eq!(format_minute_of_day(485), "08:05");
        assert_eq!(format_minute_of_day(1439), "23:59");
    }

    #[test]
    fn minute_of_day_12h_edges() {
        assert_eq!(format_minute_of_day_12h(0), "12:00 AM");
        assert_eq!(format_minute_of_day_12h(720), "12:00 PM");
        assert_eq!(format_minute_of_day_12h(1439), "11:59 PM");
        assert_eq!(format_minute_of_day_12h(570), "9:30 AM");
        assert_eq!(format_minute_of_day_12h(870), "2:30 PM");
    }

    #[test]
    fn hhmm_round_trip() {
        assert_eq!(minute_of_day_from_hhmm("08:05"), Some(485));
        assert_eq!(minute_of_day_from_hhmm("23:59"), Some(1439));
        assert_eq!(minute_of_day_from_hhmm("00:00"), Some(0));
        assert_eq!(minute_of_day_from_hhmm("24:00"), None);
        assert_eq!(minute_of_day_from_hhmm("9:61"), None);
        assert_eq!(minute_of_day_from_hhmm("garbage"), None);
    }

    #[test]
    fn time_remaining_buckets() {
        let now = ms(2024, 3, 4, 8, 0);
        assert_eq!(time_remaining_text(now - 1000, now), "Overdue");
        assert_eq!(time_remaining_text(now + 30 * MINUTE_MS, now), "30 min");
        assert_eq!(
            time_remaining_text(now + 3 * HOUR_MS + 15 * MINUTE_MS, now),
            "3h 15min"
        );
        assert_eq!(time_remaining_text(now + 2 * DAY_MS + 5 * HOUR_MS, now), "2d 5h");
    }

    #[test]
    fn lead_time_note_buckets() {
        assert_eq!(lead_time_note(30), "30 minutes before");
        assert_eq!(lead_time_note(60), "1 hour before");
        assert_eq!(lead_time_note(120), "2 hours before");
        assert_eq!(lead_time_note(1440), "1 day before");
        assert_eq!(lead_time_note(2880), "2 days before");
    }

    #[test]
    fn age_counts_whole_years() {
        let birth = ms(1990, 6, 15, 0, 0);
        assert_eq!(age_years(birth, ms(2024, 6, 14, 12, 0)), Some(33));
        assert_eq!(age_years(birth, ms(2024, 6, 15, 0, 0)), Some(34));
        assert_eq!(age_years(birth, ms(2024, 6, 16, 0, 0)), Some(34));
    }

    #[test]
    fn day_start_and_weekday() {
        // 2024-03-04 is a Monday
        let now = ms(2024, 3, 4, 15, 30);
        let start = local_day_start_ms(now, 0).unwrap();
        assert_eq!(start, ms(2024, 3, 4, 0, 0));
        assert_eq!(local_weekday(start), Some(1));
        let next = local_day_start_ms(now, 6).unwrap();
        assert_eq!(local_weekday(next), Some(0)); // Sunday
    }

    #[test]
    fn same_day_and_days_until() {
        let now = ms(2024, 3, 4, 8, 0);
        assert!(same_local_day(now, ms(2024, 3, 4, 23, 0)));
        assert!(!same_local_day(now, ms(2024, 3, 5, 0, 0)));
        assert_eq!(days_until(now + 36 * HOUR_MS, now), 2);
        assert_eq!(days_until(now - 12 * HOUR_MS, now), 0);
        assert_eq!(days_until(now - 30 * HOUR_MS, now), -1);
    }

    #[test]
    fn local_datetime_text() {
        let at = ms(2024, 3, 4, 9, 30);
        assert_eq!(format_local_datetime(at).unwrap(), "2024-03-04 at 9:30 AM");
    }
}
