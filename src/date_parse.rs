//! Best-effort parsing of free-text unavailable dates such as
//! `"Nov 20-22, Dec 1, 2025-12-24 to 2025-12-26"`.
//!
//! Tokens that cannot be understood are never an error. They are collected
//! in [`DateParseReport::skipped`] so callers can tell the user what was
//! ignored while still applying everything that did parse.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Formats that carry their own year.
const DATED_FORMATS: [&str; 3] = ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"];

/// Formats without a year; the default year is appended before parsing.
const YEARLESS_FORMATS: [&str; 2] = ["%b %d %Y", "%B %d %Y"];

/// Longest range a single token may expand to.
const MAX_RANGE_DAYS: i64 = 3660;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParseReport {
    pub dates: BTreeSet<NaiveDate>,
    pub skipped: Vec<String>,
}

impl DateParseReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn into_dates(self) -> BTreeSet<NaiveDate> {
        self.dates
    }
}

/// Parse a comma separated list of dates and inclusive ranges. Year-less
/// forms default to the year of `today`.
pub fn parse_excluded_dates(input: &str, today: NaiveDate) -> DateParseReport {
    let mut report = DateParseReport::default();
    let default_year = today.year();

    for token in split_tokens(input) {
        match parse_token(&token, default_year) {
            Some(dates) => report.dates.extend(dates),
            None => {
                debug!(token = %token, "skipping unparseable date token");
                report.skipped.push(token);
            }
        }
    }

    report
}

/// Parse one date in any supported form. A bare day-of-month number is only
/// accepted when `reference` supplies the month and year.
pub fn parse_single_date(
    input: &str,
    default_year: i32,
    reference: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for fmt in DATED_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            // chrono accepts short years for %Y; only four digit years count.
            if (1000..=9999).contains(&date.year()) {
                return Some(date);
            }
        }
    }

    if let Some(date) = parse_slash_date(input) {
        return Some(date);
    }

    let with_year = format!("{input} {default_year}");
    for fmt in YEARLESS_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, fmt) {
            return Some(date);
        }
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let day: u32 = input.parse().ok()?;
        return reference?.with_day(day);
    }

    None
}

/// `MM/DD/YYYY` or `MM/DD/YY`; the year width picks the format so a two
/// digit year is never read as the first century.
fn parse_slash_date(input: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split('/').collect();
    let [_, _, year] = parts.as_slice() else {
        return None;
    };
    let fmt = match year.trim().len() {
        4 => "%m/%d/%Y",
        2 => "%m/%d/%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(input, fmt).ok()
}

/// Split on commas, re-attaching pieces that begin with a four digit year so
/// `"Nov 20, 2025"` stays one token.
fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for piece in input.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if starts_with_year(piece) {
            if let Some(last) = tokens.last_mut() {
                if !ends_with_year(last) {
                    last.push_str(", ");
                    last.push_str(piece);
                    continue;
                }
            }
        }
        tokens.push(piece.to_string());
    }
    tokens
}

fn starts_with_year(piece: &str) -> bool {
    let bytes = piece.as_bytes();
    bytes.len() >= 4
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes.get(4).is_none_or(|b| b.is_ascii_whitespace())
}

fn ends_with_year(token: &str) -> bool {
    let bytes = token.as_bytes();
    let len = bytes.len();
    len >= 5
        && bytes[len - 4..].iter().all(u8::is_ascii_digit)
        && !bytes[len - 5].is_ascii_digit()
}

/// A token is a single date, an `A to B` range, or an `A-B` range.
fn parse_token(token: &str, default_year: i32) -> Option<Vec<NaiveDate>> {
    if let Some(date) = parse_single_date(token, default_year, None) {
        return Some(vec![date]);
    }

    let (body, year) = split_trailing_year(token).unwrap_or((token, default_year));

    if let Some((left, right)) = split_on_to(body) {
        return expand_range(left, right, year);
    }

    for (idx, _) in body.match_indices('-') {
        let (left, right) = (&body[..idx], &body[idx + 1..]);
        if let Some(dates) = expand_range(left, right, year) {
            return Some(dates);
        }
    }

    None
}

/// `"Nov 20-22, 2025"` → (`"Nov 20-22"`, 2025) so both endpoints get the year.
fn split_trailing_year(token: &str) -> Option<(&str, i32)> {
    let (body, year) = token.rsplit_once(',')?;
    let year = year.trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((body.trim(), year.parse().ok()?))
}

/// Split at the first whitespace-delimited `to`, case-insensitively.
fn split_on_to(token: &str) -> Option<(&str, &str)> {
    let lower = token.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    lower.match_indices("to").find_map(|(idx, _)| {
        let before = idx.checked_sub(1).map(|i| bytes[i])?;
        let after = *bytes.get(idx + 2)?;
        if before.is_ascii_whitespace() && after.is_ascii_whitespace() {
            Some((token[..idx].trim(), token[idx + 2..].trim()))
        } else {
            None
        }
    })
}

fn expand_range(left: &str, right: &str, default_year: i32) -> Option<Vec<NaiveDate>> {
    let start = parse_single_date(left, default_year, None)?;
    let end = parse_single_date(right, default_year, Some(start))?;
    if end < start {
        warn!(%start, %end, "ignoring reversed date range");
        return None;
    }
    let span = (end - start).num_days();
    if span >= MAX_RANGE_DAYS {
        debug!(%start, %end, "ignoring date range longer than {MAX_RANGE_DAYS} days");
        return None;
    }
    Some(
        (0..=span)
            .filter_map(|offset| start.checked_add_signed(Duration::days(offset)))
            .collect(),
    )
}
