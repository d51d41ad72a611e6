use chrono::NaiveDate;
use goalpath::{parse_excluded_dates, parse_single_date};
use std::collections::BTreeSet;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn set(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
    dates.iter().copied().collect()
}

#[test]
fn short_month_range_expands_within_current_year() {
    let report = parse_excluded_dates("Nov 20-22", d(2025, 6, 1));
    assert_eq!(
        report.dates,
        set(&[d(2025, 11, 20), d(2025, 11, 21), d(2025, 11, 22)])
    );
    assert!(report.is_clean());
}

#[test]
fn accepts_every_single_date_form() {
    let today = d(2025, 1, 15);
    assert_eq!(parse_single_date("2025-11-20", 2025, None), Some(d(2025, 11, 20)));
    assert_eq!(parse_single_date("11/20/2025", 2025, None), Some(d(2025, 11, 20)));
    assert_eq!(parse_single_date("11/20/25", 2025, None), Some(d(2025, 11, 20)));
    assert_eq!(parse_single_date("Nov 20", 2025, None), Some(d(2025, 11, 20)));
    assert_eq!(parse_single_date("November 20", 2025, None), Some(d(2025, 11, 20)));
    assert_eq!(parse_single_date("Nov 20, 2026", 2025, None), Some(d(2026, 11, 20)));

    let report = parse_excluded_dates("2025-11-20, 12/24/2025, Dec 31, Jan 2, 2026", today);
    assert_eq!(
        report.dates,
        set(&[d(2025, 11, 20), d(2025, 12, 24), d(2025, 12, 31), d(2026, 1, 2)])
    );
}

#[test]
fn to_ranges_are_case_insensitive() {
    let report = parse_excluded_dates("Dec 30 TO Jan 1", d(2025, 1, 1));
    // Reversed within one default year, so nothing is added.
    assert!(report.dates.is_empty());
    assert_eq!(report.skipped, vec!["Dec 30 TO Jan 1".to_string()]);

    let report = parse_excluded_dates("2025-11-20 to 2025-11-23", d(2025, 1, 1));
    assert_eq!(report.dates.len(), 4);
    assert!(report.dates.contains(&d(2025, 11, 23)));
}

#[test]
fn iso_hyphen_range_is_recognised() {
    let report = parse_excluded_dates("2025-11-20-2025-11-22", d(2025, 1, 1));
    assert_eq!(
        report.dates,
        set(&[d(2025, 11, 20), d(2025, 11, 21), d(2025, 11, 22)])
    );
}

#[test]
fn range_with_trailing_year_uses_that_year() {
    let report = parse_excluded_dates("Nov 20-22, 2026", d(2025, 1, 1));
    assert_eq!(
        report.dates,
        set(&[d(2026, 11, 20), d(2026, 11, 21), d(2026, 11, 22)])
    );
}

#[test]
fn month_names_containing_to_are_not_split() {
    let report = parse_excluded_dates("October 3", d(2025, 1, 1));
    assert_eq!(report.dates, set(&[d(2025, 10, 3)]));
}

#[test]
fn malformed_tokens_are_reported_not_fatal() {
    let report = parse_excluded_dates("Nov 20, someday, 13/45/2025, Dec 1", d(2025, 1, 1));
    assert_eq!(report.dates, set(&[d(2025, 11, 20), d(2025, 12, 1)]));
    assert_eq!(
        report.skipped,
        vec!["someday".to_string(), "13/45/2025".to_string()]
    );
}

#[test]
fn overlapping_inputs_are_deduplicated() {
    let report = parse_excluded_dates("Nov 20-22, Nov 21, 2025-11-22", d(2025, 1, 1));
    assert_eq!(report.dates.len(), 3);
}

#[test]
fn empty_input_yields_nothing() {
    let report = parse_excluded_dates("  ,  ", d(2025, 1, 1));
    assert!(report.dates.is_empty());
    assert!(report.is_clean());
}
