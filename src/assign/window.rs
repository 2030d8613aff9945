use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_START_MINUTES: u32 = 20 * 60;
pub const DEFAULT_END_MINUTES: u32 = 24 * 60;

/// Part of the session a temporary participant can make, in minutes since midnight.
/// `end` may be 24:00.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow {
            start: DEFAULT_START_MINUTES,
            end: DEFAULT_END_MINUTES,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}~{}",
            minutes_to_time_string(self.start),
            minutes_to_time_string(self.end)
        )
    }
}

struct WindowPatterns {
    range: Regex,
    until: Regex,
    from: Regex,
}

fn patterns() -> &'static WindowPatterns {
    static PATTERNS: OnceLock<WindowPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| WindowPatterns {
        range: Regex::new(r"(\d{1,2}):(\d{2})\s*[~〜\-]\s*(\d{1,2}):(\d{2})").expect("range pattern"),
        until: Regex::new(r"(?i)(?:until\s*(\d{1,2}):(\d{2}))|(?:(\d{1,2}):(\d{2})\s*まで)").expect("until pattern"),
        from: Regex::new(r"(?i)(?:from\s*(\d{1,2}):(\d{2}))|(?:(\d{1,2}):(\d{2})\s*(?:[~〜]|から))").expect("from pattern"),
    })
}

/// Parses "HH:MM" parts into minutes since midnight; 24:00 is the only hour-24 value.
pub fn parse_time_to_minutes(hours: &str, minutes: &str) -> Option<u32> {
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes > 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight as HH:MM, keeping 24:00 as is
pub fn minutes_to_time_string(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn first_time(caps: &regex::Captures<'_>, groups: [(usize, usize); 2]) -> Option<u32> {
    groups.iter().find_map(|&(h, m)| {
        let hours = caps.get(h)?.as_str();
        let minutes = caps.get(m)?.as_str();
        parse_time_to_minutes(hours, minutes)
    })
}

/// Reads a free-text availability note such as `21:30~22:30`, `22:00まで`
/// or `from 21:00`. Anything unrecognized falls back to the default window.
pub fn parse_time_window(text: &str) -> TimeWindow {
    let text = text.trim();
    let default = TimeWindow::default();
    if text.is_empty() {
        return default;
    }

    let p = patterns();
    if let Some(caps) = p.range.captures(text) {
        let start = first_time(&caps, [(1, 2), (1, 2)]);
        let end = first_time(&caps, [(3, 4), (3, 4)]);
        if let (Some(start), Some(end)) = (start, end) {
            return TimeWindow { start, end };
        }
        return default;
    }
    if let Some(caps) = p.until.captures(text) {
        if let Some(end) = first_time(&caps, [(1, 2), (3, 4)]) {
            return TimeWindow { end, ..default };
        }
        return default;
    }
    if let Some(caps) = p.from.captures(text) {
        if let Some(start) = first_time(&caps, [(1, 2), (3, 4)]) {
            return TimeWindow { start, ..default };
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("21:30~22:30", 21 * 60 + 30, 22 * 60 + 30)]
    #[case("9:05 - 10:00", 9 * 60 + 5, 10 * 60)]
    #[case("22:00まで", DEFAULT_START_MINUTES, 22 * 60)]
    #[case("until 23:15", DEFAULT_START_MINUTES, 23 * 60 + 15)]
    #[case("21:00から", 21 * 60, DEFAULT_END_MINUTES)]
    #[case("from 20:30", 20 * 60 + 30, DEFAULT_END_MINUTES)]
    #[case("whenever", DEFAULT_START_MINUTES, DEFAULT_END_MINUTES)]
    #[case("", DEFAULT_START_MINUTES, DEFAULT_END_MINUTES)]
    fn parses_availability_notes(#[case] text: &str, #[case] start: u32, #[case] end: u32) {
        assert_eq!(parse_time_window(text), TimeWindow { start, end });
    }

    #[test]
    fn invalid_clock_values_use_default() {
        assert_eq!(parse_time_window("25:00~26:00"), TimeWindow::default());
    }

    #[test]
    fn displays_midnight_end_as_24() {
        assert_eq!(TimeWindow::default().to_string(), "20:00~24:00");
    }
}
