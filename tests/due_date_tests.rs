use chrono::{NaiveDate, Weekday};
use goalpath::{
    AvailabilityRules, DueDateAssignment, ScheduleError, SchedulerOptions, WorkItem,
    assign_due_dates,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// 2025-03-03 is a Monday.
fn monday() -> NaiveDate {
    d(2025, 3, 3)
}

fn due_dates(items: &[WorkItem]) -> Vec<NaiveDate> {
    items.iter().map(|item| item.due_date.unwrap()).collect()
}

#[test]
fn six_hours_at_two_per_day_lands_on_third_day() {
    let items = vec![WorkItem::new(1, "Ownership", 6.0)];
    let scheduled = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(scheduled[0].due_date, Some(d(2025, 3, 5)));
}

#[test]
fn items_are_serial_and_strictly_increasing() {
    let items = vec![
        WorkItem::new(0, "a", 2.0),
        WorkItem::new(1, "b", 4.0),
        WorkItem::new(2, "c", 1.0),
        WorkItem::new(3, "d", 6.0),
    ];
    let scheduled = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(
        due_dates(&scheduled),
        vec![d(2025, 3, 3), d(2025, 3, 5), d(2025, 3, 6), d(2025, 3, 9)]
    );
    for pair in scheduled.windows(2) {
        assert!(pair[0].due_date < pair[1].due_date);
    }
}

#[test]
fn every_due_date_is_available() {
    let rules = AvailabilityRules::new()
        .with_skip_weekends(true)
        .with_skip_weekdays([Weekday::Wed])
        .with_excluded_dates([d(2025, 3, 11), d(2025, 3, 13)]);
    let items: Vec<WorkItem> = (0..12)
        .map(|i| WorkItem::new(i, format!("item {i}"), f64::from(i % 3 + 1) * 2.0))
        .collect();
    let scheduled = assign_due_dates(monday(), &items, 2.0, &rules).unwrap();
    for item in &scheduled {
        let due = item.due_date.unwrap();
        assert!(rules.is_available(due), "{due} is not available");
    }
    for pair in scheduled.windows(2) {
        assert!(pair[0].due_date < pair[1].due_date);
    }
}

#[test]
fn weekend_is_skipped_after_a_friday() {
    let rules = AvailabilityRules::new().with_skip_weekends(true);
    let friday = d(2025, 3, 7);
    let items = vec![WorkItem::new(1, "Fri", 2.0), WorkItem::new(2, "Next", 2.0)];
    let scheduled = assign_due_dates(friday, &items, 2.0, &rules).unwrap();
    assert_eq!(due_dates(&scheduled), vec![friday, d(2025, 3, 10)]);
}

#[test]
fn weekend_start_rolls_to_monday() {
    let rules = AvailabilityRules::new().with_skip_weekends(true);
    let items = vec![WorkItem::new(1, "Only", 2.0)];
    let scheduled = assign_due_dates(d(2025, 3, 8), &items, 2.0, &rules).unwrap();
    assert_eq!(scheduled[0].due_date, Some(d(2025, 3, 10)));
}

#[test]
fn missing_or_zero_effort_takes_one_day() {
    let items = vec![
        WorkItem::unestimated(1, "no estimate"),
        WorkItem::new(2, "zero", 0.0),
        WorkItem::new(3, "negative", -4.0),
    ];
    let scheduled = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(
        due_dates(&scheduled),
        vec![d(2025, 3, 3), d(2025, 3, 4), d(2025, 3, 5)]
    );
}

#[test]
fn half_day_boundary_rounds_to_even() {
    // 5h / 2h = 2.5 -> 2 days, 7h / 2h = 3.5 -> 4 days.
    let items = vec![WorkItem::new(1, "a", 5.0), WorkItem::new(2, "b", 7.0)];
    let scheduled = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(due_dates(&scheduled), vec![d(2025, 3, 4), d(2025, 3, 8)]);
}

#[test]
fn input_order_does_not_matter() {
    let items = vec![WorkItem::new(2, "second", 2.0), WorkItem::new(1, "first", 2.0)];
    let scheduled = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(scheduled[0].sequence_index, 1);
    assert_eq!(scheduled[0].due_date, Some(d(2025, 3, 3)));
    assert_eq!(scheduled[1].due_date, Some(d(2025, 3, 4)));
}

#[test]
fn rejects_non_positive_budget() {
    let items = vec![WorkItem::new(1, "a", 2.0)];
    for budget in [0.0, -1.0, f64::NAN] {
        let err = assign_due_dates(monday(), &items, budget, &AvailabilityRules::new()).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidBudget { .. }));
        assert!(err.is_validation());
    }
}

#[test]
fn rejects_duplicate_sequence_indices() {
    let items = vec![WorkItem::new(1, "a", 2.0), WorkItem::new(1, "b", 2.0)];
    let err = assign_due_dates(monday(), &items, 2.0, &AvailabilityRules::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidItems(_)));
}

#[test]
fn fully_blocked_calendar_is_exhausted() {
    let rules = AvailabilityRules::new().with_weekly_pattern([
        (Weekday::Mon, false),
        (Weekday::Tue, false),
        (Weekday::Wed, false),
        (Weekday::Thu, false),
        (Weekday::Fri, false),
        (Weekday::Sat, false),
        (Weekday::Sun, false),
    ]);
    let items = vec![WorkItem::new(7, "never", 2.0)];
    let err = DueDateAssignment::new(&rules, 2.0)
        .with_options(SchedulerOptions { horizon_days: 60 })
        .execute(monday(), &items)
        .unwrap_err();
    assert!(!err.is_validation());
    match err {
        ScheduleError::Exhausted {
            sequence_index,
            horizon_days,
            ..
        } => {
            assert_eq!(sequence_index, 7);
            assert_eq!(horizon_days, 60);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn effort_beyond_horizon_is_rejected() {
    let items = vec![WorkItem::new(1, "huge", 500.0)];
    let err = DueDateAssignment::new(&AvailabilityRules::new(), 1.0)
        .with_options(SchedulerOptions { horizon_days: 100 })
        .execute(monday(), &items)
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::EffortExceedsHorizon {
            days_needed: 500,
            ..
        }
    ));
}

#[test]
fn long_gap_after_last_item_is_fine() {
    // Everything after the 5th is excluded for a long stretch; the final item
    // must still schedule because no search runs past it.
    let rules = AvailabilityRules::new()
        .with_excluded_dates(d(2025, 3, 6).iter_days().take(200));
    let items = vec![WorkItem::new(1, "a", 2.0), WorkItem::new(2, "b", 4.0)];
    let scheduled = DueDateAssignment::new(&rules, 2.0)
        .with_options(SchedulerOptions { horizon_days: 30 })
        .execute(monday(), &items)
        .unwrap();
    assert_eq!(due_dates(&scheduled), vec![d(2025, 3, 3), d(2025, 3, 5)]);
}
