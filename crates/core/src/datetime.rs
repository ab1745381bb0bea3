//! Date and time context for prompts: French weekday names, weekends and
//! French public holidays.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weekday names indexed by days from Sunday.
const DAYS_FR: [&str; 7] = [
    "Dimanche", "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi",
];

/// Fixed-date public holidays as (month, day).
const FIXED_HOLIDAYS_FR: [(u32, u32); 8] = [
    (1, 1),   // Jour de l'an
    (5, 1),   // Fête du travail
    (5, 8),   // Victoire 1945
    (7, 14),  // Fête nationale
    (8, 15),  // Assomption
    (11, 1),  // Toussaint
    (11, 11), // Armistice
    (12, 25), // Noël
];

/// Formatted date/time context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatetimeInfo {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// French weekday name
    pub day: String,
    pub is_holiday: bool,
    pub is_weekend: bool,
}

impl DatetimeInfo {
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        let date = datetime.date();
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            time: datetime.format("%H:%M").to_string(),
            day: DAYS_FR[date.weekday().num_days_from_sunday() as usize].to_string(),
            is_holiday: is_holiday(date),
            is_weekend: is_weekend(date),
        }
    }
}

/// Build the context from an optional client-provided date-time.
///
/// Accepts RFC 3339 (the offset is kept as local wall-clock time), naive ISO
/// `YYYY-MM-DDTHH:MM[:SS]` or a bare date. Falls back to `now` when absent or
/// unparseable.
pub fn datetime_info(input: Option<&str>, now: NaiveDateTime) -> DatetimeInfo {
    let datetime = match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_datetime(raw).unwrap_or_else(|| {
            warn!(datetime = raw, "Unparseable datetime, using server time");
            now
        }),
        None => now,
    };
    DatetimeInfo::from_naive(datetime)
}

/// Build the context for an explicit `YYYY-MM-DD` date and `HH:MM` time.
pub fn datetime_info_for(date: &str, time: &str) -> Option<DatetimeInfo> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(DatetimeInfo::from_naive(date.and_time(time)))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// French public holiday, including Easter Monday, Ascension and Whit Monday.
pub fn is_holiday(date: NaiveDate) -> bool {
    if FIXED_HOLIDAYS_FR.contains(&(date.month(), date.day())) {
        return true;
    }
    let Some(easter) = easter_sunday(date.year()) else {
        return false;
    };
    [1, 39, 50]
        .iter()
        .any(|offset| easter + Duration::days(*offset) == date)
}

/// Gregorian Easter Sunday (anonymous algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
