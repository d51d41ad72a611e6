#![cfg(feature = "sqlite")]

use chrono::{NaiveDate, NaiveDateTime};
use goalpath::{
    AvailabilityRules, GoalType, Plan, PlanMetadata, PlanStore, ScheduleParameters,
    SchedulerOptions, SqlitePlanStore, WorkItem,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, day: u32, h: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, 0, 0).unwrap()
}

fn sample_plan() -> Plan {
    let items = vec![
        WorkItem::new(1, "Read the book", 2.0),
        WorkItem::new(2, "Exercises", 4.0),
        WorkItem::unestimated(3, "Review"),
    ];
    let mut plan = Plan::create(
        PlanMetadata::new("Learn SQL", GoalType::Learning, 10),
        items,
        ScheduleParameters {
            start_date: d(2025, 3, 3),
            daily_budget_hours: 2.0,
        },
        AvailabilityRules::new()
            .with_skip_weekends(true)
            .with_excluded_dates([d(2025, 3, 5)]),
    )
    .unwrap();
    plan.set_completion(1, true, 45, at(2025, 3, 3, 19)).unwrap();
    plan
}

#[test]
fn empty_store_has_no_plan() {
    let store = SqlitePlanStore::in_memory().unwrap();
    assert!(store.load_plan().unwrap().is_none());
}

#[test]
fn save_and_load_round_trip() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let plan = sample_plan().with_options(SchedulerOptions { horizon_days: 400 });
    store.save_plan(&plan).unwrap();

    let loaded = store.load_plan().unwrap().unwrap();
    assert_eq!(loaded, plan);
    assert_eq!(loaded.options().horizon_days, 400);
}

#[test]
fn saving_twice_replaces_items() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let mut plan = sample_plan();
    store.save_plan(&plan).unwrap();

    assert!(plan.remove_item(3));
    store.save_plan(&plan).unwrap();
    let loaded = store.load_plan().unwrap().unwrap();
    assert_eq!(loaded.items().len(), 2);
}

#[test]
fn reschedule_writes_only_moved_items() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.db");
    let store = SqlitePlanStore::new(&path).unwrap();
    let mut plan = sample_plan();
    store.save_plan(&plan).unwrap();

    // Tamper with the completed row so a full rewrite would be noticed.
    let mut edited = plan.find_item(1).unwrap().clone();
    edited.title = "Read the book (stored)".into();
    store.save_item(&edited).unwrap();

    let outcome = plan
        .reschedule(d(2025, 3, 10), 2.0, plan.rules().clone())
        .unwrap();
    assert_eq!(outcome.changed, vec![2, 3]);
    store.save_rescheduled(&plan, &outcome).unwrap();

    let reopened = SqlitePlanStore::new(&path).unwrap();
    let loaded = reopened.load_plan().unwrap().unwrap();
    assert_eq!(loaded.start_date(), d(2025, 3, 10));
    assert_eq!(loaded.find_item(1).unwrap().title, "Read the book (stored)");
    assert_eq!(loaded.find_item(1).unwrap().due_date, Some(d(2025, 3, 3)));
    assert_eq!(loaded.find_item(2).unwrap().due_date, Some(d(2025, 3, 11)));
    assert_eq!(loaded.find_item(3).unwrap().due_date, Some(d(2025, 3, 12)));
}

#[test]
fn progress_log_is_kept_per_item() {
    let store = SqlitePlanStore::in_memory().unwrap();
    store
        .log_progress(2, "completed", Some("tough chapter"), at(2025, 3, 4, 20))
        .unwrap();
    store.log_progress(2, "reopened", None, at(2025, 3, 5, 8)).unwrap();
    store.log_progress(3, "completed", None, at(2025, 3, 6, 9)).unwrap();

    let entries = store.progress_log(2).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "completed");
    assert_eq!(entries[0].notes.as_deref(), Some("tough chapter"));
    assert_eq!(entries[1].logged_at, at(2025, 3, 5, 8));
    assert!(store.progress_log(9).unwrap().is_empty());
}
