use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Cuts `s` down to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_index, _)) => s[..byte_index].to_string(),
        None => s.to_string(),
    }
}

/// Removes ASCII and full-width colons.
pub fn strip_colons(s: &str) -> String {
    s.chars().filter(|c| *c != ':' && *c != '：').collect()
}

/// Splits rendered text into trimmed, non-empty lines.
pub fn text_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns a timestamp token as shown by the page ("10:31 AM", "Yesterday",
/// "Mon", "1/17") into a concrete time relative to `now`.
///
/// Day-only tokens resolve to midnight. Weekday names resolve to the most
/// recent past occurrence, and `M/D` dates later than `now` roll back a year.
pub fn resolve_time_token(token: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let token = token.trim();
    let today = now.date();

    if let Some(time) = parse_clock(token) {
        return Some(today.and_time(time));
    }

    let lower = token.to_ascii_lowercase();
    if lower == "today" {
        return Some(today.and_time(NaiveTime::MIN));
    }
    if lower == "yesterday" {
        return today.pred_opt().map(|d| d.and_time(NaiveTime::MIN));
    }

    if let Ok(weekday) = token.parse::<Weekday>() {
        let current = today.weekday().num_days_from_monday();
        let target = weekday.num_days_from_monday();
        let back = match (current + 7 - target) % 7 {
            0 => 7,
            n => n,
        };
        return today
            .checked_sub_days(Days::new(u64::from(back)))
            .map(|d| d.and_time(NaiveTime::MIN));
    }

    let (month, day) = token.split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    let mut date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date > today {
        date = NaiveDate::from_ymd_opt(today.year() - 1, month, day)?;
    }
    Some(date.and_time(NaiveTime::MIN))
}

fn parse_clock(token: &str) -> Option<NaiveTime> {
    let upper = token.to_ascii_uppercase();
    let (clock, pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), true)
    } else {
        return None;
    };

    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Sanitizes a string for use in a filename
/// Replaces invalid filename characters with hyphens
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Saturday, 2026-10-17 14:05
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(char_len("日本語"), 3);
    }

    #[test]
    fn test_strip_colons_handles_fullwidth() {
        assert_eq!(strip_colons("Alice:"), "Alice");
        assert_eq!(strip_colons("王伟："), "王伟");
        assert_eq!(strip_colons("a:b：c"), "abc");
    }

    #[test]
    fn test_text_lines_drops_blank_lines() {
        assert_eq!(
            text_lines("  Alice \n\n   \nin Team Sync\r\nhello"),
            vec!["Alice", "in Team Sync", "hello"]
        );
    }

    #[test]
    fn test_resolve_clock_tokens() {
        assert_eq!(resolve_time_token("10:31 AM", now()), Some(at(2026, 10, 17, 10, 31)));
        assert_eq!(resolve_time_token("3:07pm", now()), Some(at(2026, 10, 17, 15, 7)));
        assert_eq!(resolve_time_token("12:15 AM", now()), Some(at(2026, 10, 17, 0, 15)));
        assert_eq!(resolve_time_token("12:15 PM", now()), Some(at(2026, 10, 17, 12, 15)));
        assert_eq!(resolve_time_token("13:15 PM", now()), None);
    }

    #[test]
    fn test_resolve_day_tokens() {
        assert_eq!(resolve_time_token("Today", now()), Some(at(2026, 10, 17, 0, 0)));
        assert_eq!(resolve_time_token("yesterday", now()), Some(at(2026, 10, 16, 0, 0)));
        assert_eq!(resolve_time_token("Mon", now()), Some(at(2026, 10, 12, 0, 0)));
        assert_eq!(resolve_time_token("Sat", now()), Some(at(2026, 10, 10, 0, 0)));
    }

    #[test]
    fn test_resolve_month_day_rolls_back_a_year() {
        assert_eq!(resolve_time_token("1/17", now()), Some(at(2026, 1, 17, 0, 0)));
        assert_eq!(resolve_time_token("12/24", now()), Some(at(2025, 12, 24, 0, 0)));
        assert_eq!(resolve_time_token("2/30", now()), None);
        assert_eq!(resolve_time_token("later", now()), None);
    }

    #[test]
    fn test_sanitize_filename_with_special_chars() {
        assert_eq!(sanitize_filename("Team/Sync"), "Team-Sync");
        assert_eq!(sanitize_filename("a:b*c?d"), "a-b-c-d");
        assert_eq!(sanitize_filename("  Direct Message  "), "Direct Message");
    }
}
