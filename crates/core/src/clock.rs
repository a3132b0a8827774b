use once_cell::sync::Lazy;
use regex::Regex;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

static CLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid clock regex"));

/// Parses a wall-clock "HH:MM" into minutes after midnight.
pub fn parse_clock(value: &str) -> Option<u32> {
    let captures = CLOCK_PATTERN.captures(value)?;
    let hours = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let minutes = captures.get(2)?.as_str().parse::<u32>().ok()?;

    if hours >= 24 || minutes >= 60 {
        return None;
    }

    Some(hours * 60 + minutes)
}

pub fn format_clock(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn duration_minutes(hours: f64) -> u32 {
    (hours * 60.0).round().max(0.0) as u32
}

pub fn advance(clock: u32, minutes: u32) -> u32 {
    (clock + minutes % MINUTES_PER_DAY) % MINUTES_PER_DAY
}
