//! Series detection for fill operations
//!
//! Given the values a user dragged from, decide whether they form an
//! arithmetic number series or an evenly spaced date series, and
//! extrapolate. Anything else repeats the source cyclically.
//!
//! Detection order matters: numbers are tried before dates, so
//! `["2024", "2025"]` continues as numbers.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::CellValue;

/// Allowed drift between consecutive differences in a number series
pub const NUMBER_STEP_TOLERANCE: f64 = 1e-4;

const MS_PER_DAY: f64 = 86_400_000.0;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberSequence {
    pub is_sequence: bool,
    pub step: f64,
}

impl NumberSequence {
    const NONE: NumberSequence = NumberSequence { is_sequence: false, step: 0.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSequence {
    pub is_date_sequence: bool,
    pub day_step: i64,
}

impl DateSequence {
    const NONE: DateSequence = DateSequence { is_date_sequence: false, day_step: 0 };
}

/// Parse a calendar date or date-time written as text
///
/// Accepts ISO dates (`2024-01-31`), slash/dot separated dates, US
/// `MM/DD/YYYY`, local date-times and RFC 3339 timestamps (converted to UTC).
pub fn parse_date(value: &CellValue) -> Option<NaiveDateTime> {
    let CellValue::Text(text) = value else {
        return None;
    };
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Half-up rounding, so -0.5 days rounds to 0 rather than -1
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn whole_days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    round_half_up((to - from).num_milliseconds() as f64 / MS_PER_DAY)
}

/// Detect a constant-step number series
///
/// Unparsable values are dropped first; at least two numbers must remain.
/// Every consecutive difference must match the first within
/// [`NUMBER_STEP_TOLERANCE`], otherwise there is no series at all.
pub fn detect_number_sequence(values: &[CellValue]) -> NumberSequence {
    if values.len() < 2 {
        return NumberSequence::NONE;
    }

    let numbers: Vec<f64> = values.iter().filter_map(CellValue::as_number).collect();
    if numbers.len() < 2 {
        return NumberSequence::NONE;
    }

    let step = numbers[1] - numbers[0];
    let consistent = numbers
        .windows(2)
        .all(|pair| (pair[1] - pair[0] - step).abs() <= NUMBER_STEP_TOLERANCE);

    if consistent {
        NumberSequence { is_sequence: true, step }
    } else {
        NumberSequence::NONE
    }
}

/// Detect dates spaced a whole number of days apart
pub fn detect_date_sequence(values: &[CellValue]) -> DateSequence {
    if values.len() < 2 {
        return DateSequence::NONE;
    }

    let dates: Vec<NaiveDateTime> = values.iter().filter_map(parse_date).collect();
    if dates.len() < 2 {
        return DateSequence::NONE;
    }

    let day_step = whole_days_between(dates[0], dates[1]);
    let consistent = dates
        .windows(2)
        .all(|pair| whole_days_between(pair[0], pair[1]) == day_step);

    if consistent {
        DateSequence { is_date_sequence: true, day_step }
    } else {
        DateSequence::NONE
    }
}

/// Produce `target_count` values that continue `source_values`
///
/// Number series continue from the last numeric source value; date series
/// continue from the last date and come out as `YYYY-MM-DD` text. Otherwise
/// the source repeats: `source[i % len]`.
pub fn generate_fill_values(source_values: &[CellValue], target_count: usize) -> Vec<CellValue> {
    if source_values.is_empty() {
        return Vec::new();
    }

    let numbers = detect_number_sequence(source_values);
    if numbers.is_sequence {
        if let Some(last) = source_values.iter().rev().find_map(CellValue::as_number) {
            log::debug!("fill: number series, step {}", numbers.step);
            return (1..=target_count)
                .map(|i| CellValue::Number(last + numbers.step * i as f64))
                .collect();
        }
    }

    let dates = detect_date_sequence(source_values);
    if dates.is_date_sequence {
        if let Some(last) = source_values.iter().rev().find_map(parse_date) {
            log::debug!("fill: date series, {} day(s) per step", dates.day_step);
            return (1..=target_count as i64)
                .filter_map(|i| last.checked_add_signed(Duration::days(dates.day_step * i)))
                .map(|d| CellValue::Text(d.format("%Y-%m-%d").to_string()))
                .collect();
        }
    }

    log::debug!("fill: no series, repeating {} value(s)", source_values.len());
    (0..target_count)
        .map(|i| source_values[i % source_values.len()].clone())
        .collect()
}
