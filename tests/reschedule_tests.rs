use chrono::{NaiveDate, Weekday};
use goalpath::{AvailabilityRules, ScheduleError, WorkItem, assign_due_dates, reschedule};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn scheduled_plan() -> Vec<WorkItem> {
    let items = (0..4)
        .map(|i| WorkItem::new(i, format!("day {i}"), 2.0))
        .collect::<Vec<_>>();
    let mut items = assign_due_dates(d(2025, 3, 3), &items, 2.0, &AvailabilityRules::new()).unwrap();
    items[0].is_completed = true;
    items[2].is_completed = true;
    items
}

#[test]
fn merge_keeps_sequence_order_and_completed_dates() {
    let items = scheduled_plan();
    let outcome = reschedule(&items, d(2025, 4, 1), 2.0, &AvailabilityRules::new()).unwrap();

    let order: Vec<i32> = outcome.items.iter().map(|i| i.sequence_index).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert_eq!(outcome.items[0].due_date, Some(d(2025, 3, 3)));
    assert_eq!(outcome.items[2].due_date, Some(d(2025, 3, 5)));
    assert_eq!(outcome.items[1].due_date, Some(d(2025, 4, 1)));
    assert_eq!(outcome.items[3].due_date, Some(d(2025, 4, 2)));
    assert_eq!(outcome.rescheduled, vec![1, 3]);
    assert_eq!(outcome.changed, vec![1, 3]);
}

#[test]
fn repeated_reschedules_never_touch_completed_items() {
    let items = scheduled_plan();
    let rules = AvailabilityRules::new().with_skip_weekends(true);
    let first = reschedule(&items, d(2025, 5, 2), 1.0, &rules).unwrap();
    let second = reschedule(&first.items, d(2025, 5, 2), 1.0, &rules).unwrap();

    for (before, after) in items.iter().zip(&second.items) {
        if before.is_completed {
            assert_eq!(before, after);
        }
    }
    assert_eq!(first.items, second.items);
    assert!(second.changed.is_empty(), "second run should be a no-op");
}

#[test]
fn completed_items_with_odd_data_do_not_block_reschedule() {
    let mut items = scheduled_plan();
    // A completed item on a now-excluded weekday with no estimate.
    items[0].estimated_effort_hours = None;
    items[0].due_date = Some(d(2025, 3, 3));
    let rules = AvailabilityRules::new().with_skip_weekdays([Weekday::Mon]);
    let outcome = reschedule(&items, d(2025, 3, 10), 2.0, &rules).unwrap();
    assert_eq!(outcome.items[0].due_date, Some(d(2025, 3, 3)));
    assert_eq!(outcome.items[1].due_date, Some(d(2025, 3, 11)));
}

#[test]
fn budget_is_still_validated() {
    let items = scheduled_plan();
    let err = reschedule(&items, d(2025, 4, 1), 0.0, &AvailabilityRules::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidBudget { .. }));
}

#[test]
fn changed_items_only_lists_moved_dates() {
    let items = scheduled_plan();
    // Same anchor as item 1's current date: item 1 stays, item 3 moves up.
    let outcome = reschedule(&items, d(2025, 3, 4), 2.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(outcome.items[1].due_date, Some(d(2025, 3, 4)));
    assert_eq!(outcome.items[3].due_date, Some(d(2025, 3, 5)));
    let changed: Vec<i32> = outcome.changed_items().map(|i| i.sequence_index).collect();
    assert_eq!(changed, vec![3]);
}

#[test]
fn all_completed_is_a_no_op() {
    let mut items = scheduled_plan();
    for item in &mut items {
        item.is_completed = true;
    }
    let outcome = reschedule(&items, d(2026, 1, 1), 3.0, &AvailabilityRules::new()).unwrap();
    assert_eq!(outcome.items, items);
    assert!(outcome.rescheduled.is_empty());
}

#[test]
fn duplicate_index_across_completed_and_open_is_rejected() {
    let mut items = scheduled_plan();
    items[1].sequence_index = 0;
    let err = reschedule(&items, d(2025, 4, 1), 2.0, &AvailabilityRules::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidItems(_)));
}
