use std::io::{self, Write};
use std::sync::Arc;

use study_planner::{
    AppConfig, Day, InMemoryStore, NewFixedEvent, SchedulerSnapshot, SchedulerStore,
    WeeklyPlanner, grid, import_snapshot, load_snapshot_from_json, logging, save_snapshot_to_csv,
    save_snapshot_to_json,
};

const LOCAL_USER: &str = "local";
const CELL_WIDTH: usize = 12;

/// Name of whatever occupies `hour` on `day`, fixed events first.
fn cell_label(snapshot: &SchedulerSnapshot, day: Day, hour: u8) -> String {
    let fixed = snapshot
        .fixed_events
        .iter()
        .find(|event| event.overlaps(day, hour, 1))
        .map(|event| format!("[{}]", event.name));
    let task = || {
        snapshot
            .tasks
            .iter()
            .find(|task| task.overlaps(day, hour, 1))
            .map(|task| task.name.clone())
    };
    let mut label = fixed.or_else(task).unwrap_or_default();
    if label.chars().count() > CELL_WIDTH {
        label = label.chars().take(CELL_WIDTH - 1).collect::<String>() + "~";
    }
    label
}

fn render_week_as_text_table(snapshot: &SchedulerSnapshot) -> String {
    let mut sep = String::from("+-------+");
    for _ in Day::ALL {
        sep.push_str(&"-".repeat(CELL_WIDTH + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push_str("| hour  |");
    for day in Day::ALL {
        let name = &day.as_str()[..3];
        out.push_str(&format!(" {name:<CELL_WIDTH$} |"));
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for hour in grid::hours_in_order() {
        out.push_str(&format!("| {} |", grid::format_hour(hour)));
        for day in Day::ALL {
            let label = cell_label(snapshot, day, hour);
            out.push_str(&format!(" {label:<CELL_WIDTH$} |"));
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');

    let unscheduled: Vec<String> = snapshot
        .tasks
        .iter()
        .filter(|task| !task.is_scheduled())
        .map(|task| format!("{} ({}h)", task.name, task.duration_hours))
        .collect();
    if !unscheduled.is_empty() {
        out.push_str(&format!(
            "Not scheduled (no space): {}\n",
            unscheduled.join(", ")
        ));
    }
    out
}

fn print_entries(snapshot: &SchedulerSnapshot) {
    println!("Fixed events:");
    for event in &snapshot.fixed_events {
        println!(
            "  #{:<4} {:<10} {}-{}  {}",
            event.id,
            event.day,
            grid::format_hour(event.start_hour),
            grid::format_hour(event.end_hour),
            event.name
        );
    }
    println!("Tasks:");
    for task in &snapshot.tasks {
        let slot = task
            .assigned_slot
            .map(|slot| slot.to_string())
            .unwrap_or_else(|| "not scheduled".to_string());
        println!(
            "  #{:<4} {:<20} {}h  {}",
            task.id, task.name, task.duration_hours, slot
        );
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show the weekly grid\n  list                                   List fixed events and tasks\n  event add <day> <HH:00> <HH:00> <name...>\n                                         Add a fixed event\n  event rm <id>                          Remove a fixed event (no automatic re-plan)\n  task add <hours> <name...>             Add a task in the earliest free slot\n  task everyday <hours> <name...>        Add the task once per day where it fits\n  task rm <id>                           Remove a task\n  generate                               Re-plan every task from scratch\n  reset                                  Remove all events and tasks\n  save json <path>                       Save events and tasks to JSON\n  load json <path>                       Replace events and tasks from JSON\n  export csv <path>                      Export events and tasks to CSV\n  quit|exit                              Exit"
    );
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn show(planner: &WeeklyPlanner) {
    match planner.snapshot(LOCAL_USER) {
        Ok(snapshot) => print!("{}", render_week_as_text_table(&snapshot)),
        Err(e) => println!("Error: {}", e),
    }
}

fn open_store(config: &AppConfig) -> Result<Arc<dyn SchedulerStore>, Box<dyn std::error::Error>> {
    match &config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => Ok(Arc::new(study_planner::SqliteStore::new(path)?)),
        #[cfg(not(feature = "sqlite"))]
        Some(_) => Ok(Arc::new(InMemoryStore::new())),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init_tracing(&config.log_level).map_err(|err| err.to_string())?;
    let planner = WeeklyPlanner::new(open_store(&config)?);

    println!("Study Planner (CLI) - type 'help' for commands\n");
    show(&planner);

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

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show(&planner),
            "list" => match planner.snapshot(LOCAL_USER) {
                Ok(snapshot) => print_entries(&snapshot),
                Err(e) => println!("Error: {}", e),
            },
            "event" => match parts.next() {
                Some("add") => {
                    let (day_s, start_s, end_s) = (parts.next(), parts.next(), parts.next());
                    let name = rest_of_line(parts);
                    let (Some(day_s), Some(start_s), Some(end_s)) = (day_s, start_s, end_s) else {
                        println!("Usage: event add <day> <HH:00> <HH:00> <name...>");
                        continue;
                    };
                    let day: Day = match day_s.parse() {
                        Ok(day) => day,
                        Err(e) => {
                            println!("Error: {}", e);
                            continue;
                        }
                    };
                    match planner.add_fixed_event(
                        LOCAL_USER,
                        NewFixedEvent::new(name, day, start_s, end_s),
                    ) {
                        Ok(event) => {
                            println!("Added fixed event {}.", event.id);
                            show(&planner);
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("rm") => match parts.next().map(str::parse::<i64>) {
                    Some(Ok(id)) => match planner.remove_fixed_event(LOCAL_USER, id) {
                        Ok(()) => println!(
                            "Removed fixed event {id}. Run 'generate' to re-plan affected tasks."
                        ),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: event rm <id>"),
                },
                _ => println!("Usage: event <add|rm> ..."),
            },
            "task" => {
                let sub = parts.next();
                match sub {
                    Some("add") | Some("everyday") => {
                        let hours = parts.next().map(str::parse::<u32>);
                        let name = rest_of_line(parts);
                        let Some(Ok(hours)) = hours else {
                            println!("Usage: task {} <hours> <name...>", sub.unwrap_or("add"));
                            continue;
                        };
                        if sub == Some("add") {
                            match planner.add_task(LOCAL_USER, &name, hours) {
                                Ok(task) => {
                                    match task.assigned_slot {
                                        Some(slot) => println!("Added task {} at {}.", task.id, slot),
                                        None => println!(
                                            "Added task {} (not scheduled: no space).",
                                            task.id
                                        ),
                                    }
                                    show(&planner);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        } else {
                            match planner.add_everyday_task(LOCAL_USER, &name, hours) {
                                Ok(tasks) => {
                                    println!("Added {} daily task(s).", tasks.len());
                                    show(&planner);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                    }
                    Some("rm") => match parts.next().map(str::parse::<i64>) {
                        Some(Ok(id)) => match planner.remove_task(LOCAL_USER, id) {
                            Ok(()) => println!("Removed task {id}."),
                            Err(e) => println!("Error: {}", e),
                        },
                        _ => println!("Usage: task rm <id>"),
                    },
                    _ => println!("Usage: task <add|everyday|rm> ..."),
                }
            }
            "generate" => match planner.generate(LOCAL_USER) {
                Ok((_, summary)) => {
                    println!("Generated ({})", summary.to_cli_summary());
                    show(&planner);
                }
                Err(e) => println!("Generate error: {}", e),
            },
            "reset" => match planner.reset(LOCAL_USER) {
                Ok(()) => println!("Cleared all events and tasks."),
                Err(e) => println!("Error: {}", e),
            },
            "save" | "load" | "export" => {
                let (format, path) = (parts.next(), parts.next());
                let result = match (cmd, format, path) {
                    ("save", Some("json"), Some(path)) => planner
                        .snapshot(LOCAL_USER)
                        .map_err(|e| e.to_string())
                        .and_then(|s| save_snapshot_to_json(&s, path).map_err(|e| e.to_string()))
                        .map(|_| format!("Saved to {path}")),
                    ("export", Some("csv"), Some(path)) => planner
                        .snapshot(LOCAL_USER)
                        .map_err(|e| e.to_string())
                        .and_then(|s| save_snapshot_to_csv(&s, path).map_err(|e| e.to_string()))
                        .map(|_| format!("Exported to {path}")),
                    ("load", Some("json"), Some(path)) => load_snapshot_from_json(path)
                        .and_then(|s| import_snapshot(planner.store(), LOCAL_USER, s))
                        .map_err(|e| e.to_string())
                        .map(|_| format!("Loaded from {path}")),
                    _ => Err(format!(
                        "Usage: {cmd} {} <path>",
                        if cmd == "export" { "csv" } else { "json" }
                    )),
                };
                match result {
                    Ok(message) => println!("{message}"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
