use chrono::{Local, NaiveDate, NaiveDateTime};
use goalpath::{
    AvailabilityRules, Plan, PlanMetadata, ScheduleParameters,
    WorkItem, calendar, days_until, format_date_display, load_plan_from_csv,
    load_plan_from_json, parse_curriculum, parse_excluded_dates, save_plan_to_csv,
    save_plan_to_json,
};
use polars::prelude::{AnyValue, DataFrame};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const DEFAULT_DAILY_BUDGET_HOURS: f64 = 2.0;

fn cell_text(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: &[String]| {
        out.push('|');
        for (ci, s) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the plan table\n  goal <text...>                     Set the goal description\n  add <seq> <hours> <title...>       Upsert a work item\n  remove <seq>                       Remove a work item\n  start <YYYY-MM-DD>                 Set the start date and reschedule\n  budget <hours>                     Set the daily budget and reschedule\n  exclude <text...>                  Exclude dates, e.g. 'Nov 20-22, Dec 25'\n  skipweekends <true|false>          Toggle weekend skipping\n  skipdays <csv|none>                Skip weekdays by index (0=Mon .. 6=Sun)\n  pattern <csv|off>                  Only work on the listed weekdays\n  rules                              Show availability rules\n  schedule                           Assign due dates from the start date\n  reschedule <YYYY-MM-DD> [hours]    Reschedule incomplete items\n  done <seq> [minutes]               Mark an item completed\n  undo <seq>                         Mark an item not completed\n  time <seq> <minutes>               Log time spent on an item\n  status                             Show due-date status per item\n  stats                              Show progress statistics\n  import <path>                      Import a generated curriculum (JSON text)\n  save <json|csv> <path>             Persist plan to disk\n  load <json|csv> <path>             Load plan from disk\n  quit|exit                          Exit"
    );
}

fn print_table(plan: &Plan) {
    match plan.dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering table: {}", e),
    }
}

fn print_rules(rules: &AvailabilityRules) {
    let config = rules.to_config();
    let excluded = config
        .excluded_dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let skipped = config
        .skip_weekdays
        .iter()
        .filter_map(|idx| calendar::weekday_from_index(*idx))
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let pattern = match &config.weekly_pattern {
        Some(pattern) => pattern
            .iter()
            .filter(|(_, available)| **available)
            .filter_map(|(idx, _)| calendar::weekday_from_index(*idx))
            .map(|wd| wd.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        None => "off".to_string(),
    };
    println!("Skip weekends      : {}", config.skip_weekends);
    println!("Skipped weekdays   : {}", skipped);
    println!("Weekly pattern     : {}", pattern);
    println!("Excluded dates     : {}", excluded);
}

fn parse_weekday_indices(input: &str) -> Option<Vec<u8>> {
    input
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok().filter(|idx| *idx <= 6))
        .collect()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Apply new parameters through a reschedule so the plan keeps its due
/// dates consistent with the rules it stores.
fn apply(plan: &mut Plan, start: NaiveDate, budget: f64, rules: AvailabilityRules, what: &str) {
    match plan.reschedule(start, budget, rules) {
        Ok(outcome) => {
            println!(
                "{} updated ({} rescheduled, {} changed).",
                what,
                outcome.rescheduled.len(),
                outcome.changed.len()
            );
            print_table(plan);
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goalpath=info")),
        )
        .with_writer(io::stderr)
        .init();

    let parameters = ScheduleParameters {
        start_date: today(),
        daily_budget_hours: DEFAULT_DAILY_BUDGET_HOURS,
    };
    let mut plan = match Plan::new(PlanMetadata::default(), parameters, AvailabilityRules::new()) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error creating plan: {}", e);
            return;
        }
    };

    println!("Goal Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let start = plan.start_date();
        let budget = plan.daily_budget_hours();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_table(&plan),
            "goal" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: goal <text...>");
                    continue;
                }
                plan.set_goal(rest.join(" "));
                println!("Goal set: {}", plan.metadata().goal);
            }
            "add" => {
                let seq_s = parts.next();
                let hours_s = parts.next();
                let title: Vec<&str> = parts.collect();
                match (seq_s, hours_s, title.is_empty()) {
                    (Some(seq_s), Some(hours_s), false) => {
                        let seq: i32 = match seq_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid sequence index");
                                continue;
                            }
                        };
                        let hours: f64 = match hours_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid hours");
                                continue;
                            }
                        };
                        match plan.upsert_item(WorkItem::new(seq, title.join(" "), hours)) {
                            Ok(()) => {
                                println!("Item upserted.");
                                print_table(&plan);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <seq> <hours> <title...>"),
                }
            }
            "remove" => match parts.next().map(str::parse::<i32>) {
                Some(Ok(seq)) => {
                    if plan.remove_item(seq) {
                        println!("Removed item {seq}.");
                    } else {
                        println!("Item {seq} not found.");
                    }
                }
                Some(Err(_)) => println!("Invalid sequence index"),
                None => println!("Usage: remove <seq>"),
            },
            "start" => match parts
                .next()
                .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            {
                Some(Ok(date)) => {
                    let rules = plan.rules().clone();
                    apply(&mut plan, date, budget, rules, "Start date");
                }
                _ => println!("Usage: start <YYYY-MM-DD>"),
            },
            "budget" => match parts.next().map(str::parse::<f64>) {
                Some(Ok(hours)) => {
                    let rules = plan.rules().clone();
                    apply(&mut plan, start, hours, rules, "Daily budget");
                }
                _ => println!("Usage: budget <hours>"),
            },
            "exclude" => {
                let text: Vec<&str> = parts.collect();
                if text.is_empty() {
                    println!("Usage: exclude <text...>");
                    continue;
                }
                let report = parse_excluded_dates(&text.join(" "), today());
                if !report.is_clean() {
                    println!("Skipped: {}", report.skipped.join(", "));
                }
                println!("Parsed {} date(s).", report.dates.len());
                let rules = plan.rules().clone().with_excluded_dates(report.into_dates());
                apply(&mut plan, start, budget, rules, "Exclusions");
            }
            "skipweekends" => {
                let value = match parts.next().map(|s| s.to_ascii_lowercase()) {
                    Some(s) if s == "true" => true,
                    Some(s) if s == "false" => false,
                    _ => {
                        println!("Usage: skipweekends <true|false>");
                        continue;
                    }
                };
                let rules = plan.rules().clone().with_skip_weekends(value);
                apply(&mut plan, start, budget, rules, "Weekend skipping");
            }
            "skipdays" | "pattern" => {
                let Some(arg) = parts.next() else {
                    println!("Usage: {} <csv>", cmd);
                    continue;
                };
                let mut config = plan.rules().to_config();
                let clear = matches!(arg, "none" | "off");
                let indices = if clear {
                    Vec::new()
                } else {
                    match parse_weekday_indices(arg) {
                        Some(v) => v,
                        None => {
                            println!("Invalid weekday list (use 0=Mon .. 6=Sun)");
                            continue;
                        }
                    }
                };
                if cmd == "skipdays" {
                    config.skip_weekdays = indices;
                } else if clear {
                    config.weekly_pattern = None;
                } else {
                    config.weekly_pattern =
                        Some((0..=6).map(|idx| (idx, indices.contains(&idx))).collect());
                }
                match AvailabilityRules::from_config(&config) {
                    Ok(rules) => apply(&mut plan, start, budget, rules, "Weekday rules"),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "rules" => print_rules(plan.rules()),
            "schedule" => match plan.refresh() {
                Ok(_) => {
                    println!(
                        "Scheduled ({})\n",
                        plan.summary(today()).to_cli_summary()
                    );
                    print_table(&plan);
                }
                Err(e) => println!("Schedule error: {}", e),
            },
            "reschedule" => {
                let date = parts
                    .next()
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
                let hours = match parts.next().map(str::parse::<f64>) {
                    None => Some(budget),
                    Some(Ok(h)) => Some(h),
                    Some(Err(_)) => None,
                };
                match (date, hours) {
                    (Some(date), Some(hours)) => {
                        let rules = plan.rules().clone();
                        apply(&mut plan, date, hours, rules, "Plan");
                    }
                    _ => println!("Usage: reschedule <YYYY-MM-DD> [hours]"),
                }
            }
            "done" | "undo" => {
                let seq = match parts.next().map(str::parse::<i32>) {
                    Some(Ok(seq)) => seq,
                    _ => {
                        println!("Usage: {} <seq>{}", cmd, if cmd == "done" { " [minutes]" } else { "" });
                        continue;
                    }
                };
                let minutes = match parts.next().map(str::parse::<i64>) {
                    None => 0,
                    Some(Ok(m)) => m,
                    Some(Err(_)) => {
                        println!("Invalid minutes");
                        continue;
                    }
                };
                match plan.set_completion(seq, cmd == "done", minutes, now()) {
                    Ok(item) if item.is_completed => println!("Item {seq} completed."),
                    Ok(_) => println!("Item {seq} reopened."),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "time" => {
                let seq = parts.next().and_then(|s| s.parse::<i32>().ok());
                let minutes = parts.next().and_then(|s| s.parse::<i64>().ok());
                match (seq, minutes) {
                    (Some(seq), Some(minutes)) => match plan.log_time(seq, minutes) {
                        Ok(()) => println!("Logged {minutes} minute(s) on item {seq}."),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: time <seq> <minutes>"),
                }
            }
            "status" => {
                let today = today();
                for item in plan.items() {
                    let Some(display) = plan.item_status(item.sequence_index, today) else {
                        continue;
                    };
                    let due = item
                        .due_date
                        .map(format_date_display)
                        .unwrap_or_else(|| "-".to_string());
                    let days = days_until(item.due_date, today)
                        .map(|d| format!("{d:+}d"))
                        .unwrap_or_default();
                    println!(
                        "{:>4}  {:<12} {:<10} {:>6}  {}",
                        item.sequence_index,
                        due,
                        display.status.as_str(),
                        days,
                        item.title
                    );
                }
            }
            "stats" => {
                let stats = plan.progress_stats();
                println!("Items completed    : {}/{}", stats.completed_items, stats.total_items);
                println!("Progress           : {:.1}%", stats.progress_percentage);
                println!("Time spent         : {} h", stats.time_spent_hours);
            }
            "import" => {
                let Some(path) = parts.next() else {
                    println!("Usage: import <path>");
                    continue;
                };
                let text = match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => {
                        println!("Error reading {}: {}", path, e);
                        continue;
                    }
                };
                match parse_curriculum(&text) {
                    Ok(items) => {
                        let count = items.len();
                        let mut failed = false;
                        for mut item in items {
                            if item.estimated_effort_hours.is_none() {
                                item.estimated_effort_hours = Some(budget);
                            }
                            if let Err(e) = plan.upsert_item(item) {
                                println!("Error: {}", e);
                                failed = true;
                                break;
                            }
                        }
                        if !failed {
                            println!("Imported {count} item(s).");
                            print_table(&plan);
                        }
                    }
                    Err(e) => println!("Import error: {}", e),
                }
            }
            "save" | "load" => {
                let format = parts.next().map(|s| s.to_ascii_lowercase());
                let path = parts.next();
                let (Some(format), Some(path)) = (format, path) else {
                    println!("Usage: {} <json|csv> <path>", cmd);
                    continue;
                };
                if cmd == "save" {
                    let res = match format.as_str() {
                        "json" => save_plan_to_json(&plan, path),
                        "csv" => save_plan_to_csv(&plan, path),
                        _ => {
                            println!("Unknown format '{}'", format);
                            continue;
                        }
                    };
                    match res {
                        Ok(()) => println!("Plan saved to {}", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    }
                } else {
                    let res = match format.as_str() {
                        "json" => load_plan_from_json(path),
                        "csv" => load_plan_from_csv(path),
                        _ => {
                            println!("Unknown format '{}'", format);
                            continue;
                        }
                    };
                    match res {
                        Ok(loaded) => {
                            plan = loaded;
                            println!("Plan loaded from {}", path);
                            print_table(&plan);
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    }
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
