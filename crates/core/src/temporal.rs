//! Free-form date text to clinic-timezone instants.
//!
//! Parsing runs an ordered chain of strategies and stops at the first one
//! that succeeds:
//!
//! 1. [`Strategy::Natural`]: phrases anchored at "now" (`tomorrow 09:30`,
//!    `next tuesday at 3pm`, `in 2 weeks`, `Nov 15`, RFC 3339 instants)
//! 2. [`Strategy::Keyword`]: any text mentioning `tomorrow` or `today`
//! 3. [`Strategy::StrictFormat`]: fixed numeric layouts (`2025-11-15 10:30`,
//!    `15.11.2025`)
//!
//! Every result is then coerced into the future: users never ask for a past
//! appointment, so a date that already passed is moved forward (one year at
//! a time when no year was written, otherwise day by day).

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::{ScheduleError, ScheduleResult};

/// Hour used when a datetime is requested but the text names no time.
pub const DEFAULT_HOUR: u32 = 9;

/// Furthest ahead of today a parsed date may land, in days.
pub const MAX_OFFSET_DAYS: i64 = 3660;

const YEAR_BUMP_ATTEMPTS: usize = 3;

static EXPLICIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern is valid"));

/// Whether the caller wants a whole day or a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Date,
    DateTime,
}

/// Wall-clock reading produced by a strategy, before it is placed in the
/// clinic timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// Relative to "now" (today, tomorrow, weekdays, offsets). Such results
    /// never get a year bump.
    pub anchored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Natural,
    Keyword,
    StrictFormat,
}

impl Strategy {
    pub const CHAIN: [Strategy; 3] = [Strategy::Natural, Strategy::Keyword, Strategy::StrictFormat];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Natural => "natural",
            Strategy::Keyword => "keyword",
            Strategy::StrictFormat => "strict",
        }
    }

    pub fn attempt(self, text: &str, now: &DateTime<Tz>) -> Result<Resolution, String> {
        let resolution = match self {
            Strategy::Natural => parse_natural(text, now),
            Strategy::Keyword => parse_keyword(text, now),
            Strategy::StrictFormat => parse_strict(text),
        }?;

        let offset = resolution.date.signed_duration_since(now.date_naive()).num_days();
        if offset > MAX_OFFSET_DAYS {
            return Err(format!("{} is too far ahead", resolution.date));
        }
        Ok(resolution)
    }
}

/// Resolves user text against the clinic timezone and clock.
#[derive(Clone)]
pub struct TemporalNormalizer {
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TemporalNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalNormalizer")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl TemporalNormalizer {
    pub fn new(timezone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { timezone, clock }
    }

    /// Current instant in the clinic timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }

    /// Calendar day named by `text`, at midnight clinic time.
    pub fn parse_date(&self, text: &str) -> ScheduleResult<DateTime<Tz>> {
        self.parse_date_at(text, &self.now())
    }

    /// Point in time named by `text`; 09:00 when no time is given.
    pub fn parse_datetime(&self, text: &str) -> ScheduleResult<DateTime<Tz>> {
        self.parse_datetime_at(text, &self.now())
    }

    pub fn parse_date_at(&self, text: &str, now: &DateTime<Tz>) -> ScheduleResult<DateTime<Tz>> {
        self.normalize(text, now, Precision::Date)
    }

    pub fn parse_datetime_at(&self, text: &str, now: &DateTime<Tz>) -> ScheduleResult<DateTime<Tz>> {
        self.normalize(text, now, Precision::DateTime)
    }

    fn normalize(&self, text: &str, now: &DateTime<Tz>, precision: Precision) -> ScheduleResult<DateTime<Tz>> {
        let now = now.with_timezone(&self.timezone);
        let (strategy, resolution) = resolve(text, &now)?;

        let naive = match precision {
            Precision::Date => resolution.date.and_time(NaiveTime::MIN),
            Precision::DateTime => resolution.date.and_time(resolution.time.unwrap_or(default_time())),
        };
        let reference = match precision {
            Precision::Date => start_of_day(&now),
            Precision::DateTime => Some(now),
        }
        .ok_or_else(|| ScheduleError::date_parse(text, vec!["current day has no midnight".to_string()]))?;

        let allow_year_bump = !resolution.anchored && !has_explicit_year(text);
        let resolved = coerce_future(naive, &reference, allow_year_bump)
            .ok_or_else(|| ScheduleError::date_parse(text, vec!["no valid local time".to_string()]))?;

        info!(
            raw = %text,
            parsed = %resolved.to_rfc3339(),
            strategy = strategy.name(),
            ?precision,
            "normalized date text"
        );
        Ok(resolved)
    }
}

/// Runs the strategy chain, collecting every failure reason.
pub fn resolve(text: &str, now: &DateTime<Tz>) -> ScheduleResult<(Strategy, Resolution)> {
    let mut reasons = Vec::new();
    for strategy in Strategy::CHAIN {
        match strategy.attempt(text, now) {
            Ok(resolution) => return Ok((strategy, resolution)),
            Err(reason) => {
                debug!(raw = %text, strategy = strategy.name(), %reason, "strategy failed");
                reasons.push(format!("{}: {}", strategy.name(), reason));
            }
        }
    }
    Err(ScheduleError::date_parse(text, reasons))
}

/// Places a wall-clock reading in `tz`. Ambiguous readings take the earlier
/// instant; readings inside a DST gap move forward by an hour.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}

pub fn has_explicit_year(text: &str) -> bool {
    EXPLICIT_YEAR.is_match(text)
}

/// Moves `naive` forward until it is not earlier than `reference`.
pub fn coerce_future(naive: NaiveDateTime, reference: &DateTime<Tz>, allow_year_bump: bool) -> Option<DateTime<Tz>> {
    let tz = reference.timezone();
    let mut candidate = naive;
    let resolved = localize(&tz, candidate)?;
    if resolved >= *reference {
        return Some(resolved);
    }

    if allow_year_bump {
        for _ in 0..YEAR_BUMP_ATTEMPTS {
            candidate = candidate
                .with_year(candidate.year() + 1)
                .unwrap_or(candidate + Duration::days(365));
            let resolved = localize(&tz, candidate)?;
            if resolved >= *reference {
                return Some(resolved);
            }
        }
    }

    // Skip whole days up to the day before the reference, then walk.
    let gap = (reference.date_naive() - candidate.date()).num_days();
    if gap > 1 {
        candidate += Duration::days(gap - 1);
    }
    loop {
        let resolved = localize(&tz, candidate)?;
        if resolved >= *reference {
            return Some(resolved);
        }
        candidate += Duration::days(1);
    }
}

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn start_of_day(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    localize(&now.timezone(), now.date_naive().and_time(NaiveTime::MIN))
}

const FILLER: [&str; 4] = ["on", "the", "of", "for"];

fn parse_natural(text: &str, now: &DateTime<Tz>) -> Result<Resolution, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty input".to_string());
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        let local = instant.with_timezone(&now.timezone());
        return Ok(Resolution {
            date: local.date_naive(),
            time: Some(local.time()),
            anchored: false,
        });
    }

    let normalized = normalize_text(trimmed);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let (date_tokens, time) = split_time(&tokens)?;

    let today = now.date_naive();
    let (date, anchored, implied_time) = if date_tokens.is_empty() {
        match time {
            Some(_) => (today, true, None),
            None => return Err("no date or time found".to_string()),
        }
    } else {
        parse_date_phrase(&date_tokens, today)?
    };

    Ok(Resolution {
        date,
        time: time.or(implied_time),
        anchored,
    })
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .replace([',', '!', '?'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Separates time-of-day tokens from the date phrase.
fn split_time<'a>(tokens: &[&'a str]) -> Result<(Vec<&'a str>, Option<NaiveTime>), String> {
    let mut date_tokens = Vec::new();
    let mut time = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        let found = if token == "at" {
            match parse_time_at(&tokens[i + 1..], true) {
                Some((t, consumed)) => Some((t, consumed + 1)),
                None => return Err("expected a time after 'at'".to_string()),
            }
        } else {
            parse_time_at(&tokens[i..], false)
        };

        match found {
            Some((t, consumed)) => {
                if time.is_some() {
                    return Err("more than one time of day".to_string());
                }
                time = Some(t);
                i += consumed;
            }
            None => {
                if !FILLER.contains(&token) {
                    date_tokens.push(token);
                }
                i += 1;
            }
        }
    }

    Ok((date_tokens, time))
}

/// Reads a time from the head of `tokens`, returning it and how many tokens
/// it used. Bare hours (`9`) are only accepted after `at`.
fn parse_time_at(tokens: &[&str], allow_bare_hour: bool) -> Option<(NaiveTime, usize)> {
    let first = *tokens.first()?;

    if let Some(time) = named_time(first) {
        return Some((time, 1));
    }

    for (suffix, pm) in [("am", false), ("pm", true)] {
        if let Some(clock) = first.strip_suffix(suffix) {
            if !clock.is_empty() {
                return twelve_hour(clock, pm).map(|t| (t, 1));
            }
        }
    }

    if let Some(&meridiem) = tokens.get(1) {
        let pm = match meridiem {
            "am" => Some(false),
            "pm" => Some(true),
            _ => None,
        };
        if let Some(pm) = pm {
            return twelve_hour(first, pm).map(|t| (t, 2));
        }
    }

    if first.contains(':') {
        return NaiveTime::parse_from_str(first, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(first, "%H:%M:%S"))
            .ok()
            .map(|t| (t, 1));
    }

    if allow_bare_hour {
        let hour: u32 = first.parse().ok()?;
        return NaiveTime::from_hms_opt(hour, 0, 0).map(|t| (t, 1));
    }

    None
}

fn named_time(token: &str) -> Option<NaiveTime> {
    let (h, m) = match token {
        "noon" => (12, 0),
        "morning" => (9, 0),
        "afternoon" => (13, 0),
        "evening" => (18, 0),
        _ => return None,
    };
    NaiveTime::from_hms_opt(h, m, 0)
}

fn twelve_hour(clock: &str, pm: bool) -> Option<NaiveTime> {
    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };
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

/// Returns the date, whether it is relative to today, and a time implied by
/// the phrase itself ("tonight").
fn parse_date_phrase(tokens: &[&str], today: NaiveDate) -> Result<(NaiveDate, bool, Option<NaiveTime>), String> {
    let relative = |days: i64| {
        if days.abs() > MAX_OFFSET_DAYS {
            return Err(format!("offset of {} days is out of range", days));
        }
        Ok((today + Duration::days(days), true, None))
    };

    match tokens {
        ["today"] => relative(0),
        ["tonight"] => Ok((today, true, NaiveTime::from_hms_opt(19, 0, 0))),
        ["tomorrow"] => relative(1),
        ["day", "after", "tomorrow"] => relative(2),
        ["in", amount, unit] => {
            let amount: i64 = amount.parse().map_err(|_| format!("'{}' is not a number", amount))?;
            let per_unit = match unit.trim_end_matches('s') {
                "day" => 1,
                "week" => 7,
                other => return Err(format!("unsupported offset unit '{}'", other)),
            };
            let days = amount
                .checked_mul(per_unit)
                .ok_or_else(|| format!("offset of {} {} is out of range", amount, unit))?;
            relative(days)
        }
        [modifier @ ("next" | "this"), token] => {
            let target = parse_weekday(token).ok_or_else(|| format!("'{}' is not a weekday", token))?;
            relative(days_until(today, target, *modifier == "next"))
        }
        [token] => match parse_weekday(token) {
            Some(target) => relative(days_until(today, target, false)),
            None => NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .map(|date| (date, false, None))
                .map_err(|_| format!("unrecognized date phrase '{}'", token)),
        },
        _ => calendar_date(tokens, today).map(|date| (date, false, None)),
    }
}

/// Days from `today` to the next `target`. Today counts unless `strict`.
fn days_until(today: NaiveDate, target: Weekday, strict: bool) -> i64 {
    let ahead = (target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64 + 7) % 7;
    if strict && ahead == 0 { 7 } else { ahead }
}

/// `nov 15`, `november 15th 2025`, `15 nov`, `15th november 2025`.
fn calendar_date(tokens: &[&str], today: NaiveDate) -> Result<NaiveDate, String> {
    let (month, day, year) = match tokens {
        [a, b] => month_and_day(a, b).map(|(m, d)| (m, d, None)),
        [a, b, y] => month_and_day(a, b).map(|(m, d)| (m, d, Some(*y))),
        _ => None,
    }
    .ok_or_else(|| format!("unrecognized date phrase '{}'", tokens.join(" ")))?;

    match year {
        Some(y) => {
            let year: i32 = y.parse().map_err(|_| format!("'{}' is not a year", y))?;
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("{}-{}-{} is not a date", year, month, day))
        }
        // Feb 29 without a year lands on the next leap year.
        None => (0..4)
            .find_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day))
            .ok_or_else(|| format!("month {} has no day {}", month, day)),
    }
}

fn month_and_day(a: &str, b: &str) -> Option<(u32, u32)> {
    if let (Some(month), Some(day)) = (parse_month(a), parse_day(b)) {
        return Some((month, day));
    }
    match (parse_day(a), parse_month(b)) {
        (Some(day), Some(month)) => Some((month, day)),
        _ => None,
    }
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

fn parse_month(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june",
        "july", "august", "september", "october", "november", "december",
    ];
    let token = token.trim_end_matches('.');
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(token))
        .map(|idx| idx as u32 + 1)
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    let weekday = match token.trim_end_matches('.') {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn parse_keyword(text: &str, now: &DateTime<Tz>) -> Result<Resolution, String> {
    let normalized = normalize_text(text);
    let today = now.date_naive();

    let date = if normalized.contains("tomorrow") {
        today + Duration::days(1)
    } else if normalized.contains("today") {
        today
    } else {
        return Err("no 'today' or 'tomorrow' keyword".to_string());
    };

    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let time = (0..tokens.len()).find_map(|i| {
        let allow_bare = i > 0 && tokens[i - 1] == "at";
        parse_time_at(&tokens[i..], allow_bare).map(|(t, _)| t)
    });

    Ok(Resolution {
        date,
        time,
        anchored: true,
    })
}

const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

fn parse_strict(text: &str) -> Result<Resolution, String> {
    let trimmed = text.trim();

    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(Resolution {
            date: naive.date(),
            time: Some(naive.time()),
            anchored: false,
        });
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| Resolution {
            date,
            time: None,
            anchored: false,
        })
        .ok_or_else(|| format!("'{}' matches no known layout", trimmed))
}
