//! Timestamp resolution and human-facing time labels

use chrono::{
    DateTime, Datelike, FixedOffset, Month, NaiveDate, NaiveDateTime, Offset, Utc, Weekday,
};
use lms_types::Locale;
use serde_json::Value;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Naive layouts accepted after RFC 3339 fails, interpreted as UTC
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse one timestamp field
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD HH:MM:SS` (UTC), bare dates
/// (midnight UTC) and unix seconds given as a JSON number or numeric string.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(from_unix_seconds)
            .or_else(|| number.as_f64().and_then(from_fractional_seconds)),
        Value::String(text) => parse_timestamp_str(text),
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(seconds) = text.parse::<i64>() {
        return from_unix_seconds(seconds);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn from_unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_fractional_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// First candidate that parses, or `now`
#[must_use]
pub fn resolve_occurred_at(candidates: &[&Value], now: DateTime<Utc>) -> DateTime<Utc> {
    candidates
        .iter()
        .find_map(|candidate| parse_timestamp(candidate))
        .unwrap_or(now)
}

/// How times are shown to the viewer: language and local UTC offset
///
/// Day buckets compare calendar dates in `offset`, so a record 23 hours old
/// can be "Today" or "Yesterday" depending on the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDisplay {
    locale: Locale,
    offset: FixedOffset,
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self::new(Locale::default(), utc_offset())
    }
}

impl TimeDisplay {
    /// Create a display policy
    #[must_use]
    pub const fn new(locale: Locale, offset: FixedOffset) -> Self {
        Self { locale, offset }
    }

    /// Build from an offset in minutes east of UTC; out-of-range offsets fall back to UTC
    #[must_use]
    pub fn from_offset_minutes(locale: Locale, minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(utc_offset);
        Self::new(locale, offset)
    }

    /// Display language
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Viewer's UTC offset
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Elapsed-time label: seconds, minutes, hours, then an absolute date
    #[must_use]
    pub fn relative_time(&self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let elapsed = (now - occurred_at).num_seconds().max(0);

        if elapsed < SECONDS_PER_MINUTE {
            self.ago(elapsed, Unit::Second)
        } else if elapsed < SECONDS_PER_HOUR {
            self.ago(elapsed / SECONDS_PER_MINUTE, Unit::Minute)
        } else if elapsed < SECONDS_PER_DAY {
            self.ago(elapsed / SECONDS_PER_HOUR, Unit::Hour)
        } else {
            self.absolute_date(occurred_at)
        }
    }

    /// Calendar bucket label: today, yesterday, or weekday + full date
    #[must_use]
    pub fn date_bucket(&self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let day = self.local_date(occurred_at);
        let today = self.local_date(now);

        if day == today {
            self.today_label().to_string()
        } else if today.pred_opt() == Some(day) {
            self.yesterday_label().to_string()
        } else {
            self.long_date(day)
        }
    }

    /// Whether `occurred_at` falls on the viewer's current calendar day
    #[must_use]
    pub fn is_same_day(&self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.local_date(occurred_at) == self.local_date(now)
    }

    /// Label used for the current day's bucket
    #[must_use]
    pub const fn today_label(&self) -> &'static str {
        match self.locale {
            Locale::Indonesian => "Hari Ini",
            Locale::English => "Today",
        }
    }

    /// Label used for the previous day's bucket
    #[must_use]
    pub const fn yesterday_label(&self) -> &'static str {
        match self.locale {
            Locale::Indonesian => "Kemarin",
            Locale::English => "Yesterday",
        }
    }

    /// Short absolute date, e.g. `1 Jan 2024` or `Jan 1, 2024`
    #[must_use]
    pub fn absolute_date(&self, instant: DateTime<Utc>) -> String {
        let date = self.local_date(instant);
        let month = month_of(date);
        match self.locale {
            Locale::Indonesian => format!(
                "{} {} {}",
                date.day(),
                short_month_id(month),
                date.year()
            ),
            Locale::English => format!(
                "{} {}, {}",
                short_month_en(month),
                date.day(),
                date.year()
            ),
        }
    }

    fn long_date(&self, date: NaiveDate) -> String {
        let month = month_of(date);
        match self.locale {
            Locale::Indonesian => format!(
                "{}, {} {} {}",
                weekday_id(date.weekday()),
                date.day(),
                month_id(month),
                date.year()
            ),
            Locale::English => format!(
                "{}, {} {}, {}",
                weekday_en(date.weekday()),
                month.name(),
                date.day(),
                date.year()
            ),
        }
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    fn ago(&self, amount: i64, unit: Unit) -> String {
        match self.locale {
            Locale::Indonesian => format!("{amount} {} yang lalu", unit.indonesian()),
            Locale::English => {
                let plural = if amount == 1 { "" } else { "s" };
                format!("{amount} {}{plural} ago", unit.english())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
}

impl Unit {
    const fn indonesian(self) -> &'static str {
        match self {
            Self::Second => "detik",
            Self::Minute => "menit",
            Self::Hour => "jam",
        }
    }

    const fn english(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[allow(clippy::cast_possible_truncation)]
fn month_of(date: NaiveDate) -> Month {
    Month::try_from(date.month() as u8).unwrap_or(Month::January)
}

const fn weekday_id(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

const fn weekday_en(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

const fn month_id(month: Month) -> &'static str {
    match month {
        Month::January => "Januari",
        Month::February => "Februari",
        Month::March => "Maret",
        Month::April => "April",
        Month::May => "Mei",
        Month::June => "Juni",
        Month::July => "Juli",
        Month::August => "Agustus",
        Month::September => "September",
        Month::October => "Oktober",
        Month::November => "November",
        Month::December => "Desember",
    }
}

const fn short_month_id(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "Mei",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Agu",
        Month::September => "Sep",
        Month::October => "Okt",
        Month::November => "Nov",
        Month::December => "Des",
    }
}

const fn short_month_en(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
