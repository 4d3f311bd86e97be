use chrono::{NaiveDate, NaiveDateTime};
use fieldops_schedule::{
    AvailabilityResolver, ConflictChecker, DispatchBoard, EngineConfig, FieldOpsSnapshot,
    Project, chart_bounds, compute_critical_path, dispatch_frame, load_appointments_from_csv,
    load_snapshot_from_json, logging, project_layout, render_text_table, save_snapshot_to_json,
    schedule_frame,
};
use std::io::{self, Write};

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  load <json_path>                       Load a snapshot file\n  save <json_path>                       Write the current snapshot\n  import <csv_path>                      Merge appointments from CSV\n  config <json_path>                     Load engine settings\n  workers                                List workers\n  check <worker_id> <start> <end>        Availability (times as YYYY-MM-DDTHH:MM)\n  conflicts <worker_id> <start> <end> [exclude_id]\n                                         Double-booking check\n  dispatch <start> <end>                 Rank every worker for a slot\n  cpm <project_id>                       Critical path and slack\n  gantt <project_id> [start end]         Bar placement in percent\n  report <project_id>                    Combined schedule table\n  quit|exit                              Exit"
    );
}

fn print_workers(snapshot: &FieldOpsSnapshot) {
    if snapshot.workers.is_empty() {
        println!("No workers loaded.");
        return;
    }
    for worker in &snapshot.workers {
        let days = worker
            .weekly_schedule
            .iter()
            .filter(|e| e.is_active)
            .map(|e| e.weekday.to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<12} {:<24} days={} seasons={} exceptions={}",
            worker.id,
            worker.name,
            if days.is_empty() { "-" } else { days.as_str() },
            worker.seasonal_windows.len(),
            worker.unavailability.len()
        );
    }
}

fn find_project<'a>(snapshot: &'a FieldOpsSnapshot, id: Option<&str>) -> Option<&'a Project> {
    let Some(id) = id else {
        println!("Usage: <command> <project_id>");
        return None;
    };
    let project = snapshot.find_project(id);
    if project.is_none() {
        println!("Project {id} not found.");
    }
    project
}

fn main() {
    logging::init_tracing("warn");

    let mut snapshot = FieldOpsSnapshot::default();
    let mut resolver = AvailabilityResolver::new(EngineConfig::default());

    if let Some(path) = std::env::args().nth(1) {
        match load_snapshot_from_json(&path) {
            Ok(loaded) => snapshot = loaded,
            Err(e) => println!("Error loading {path}: {e}"),
        }
    }

    println!("FieldOps scheduling (CLI) - type 'help' for commands\n");

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
            "load" => match parts.next() {
                Some(path) => match load_snapshot_from_json(path) {
                    Ok(loaded) => {
                        println!(
                            "Loaded {} workers, {} appointments, {} projects.",
                            loaded.workers.len(),
                            loaded.appointments.len(),
                            loaded.projects.len()
                        );
                        snapshot = loaded;
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: load <json_path>"),
            },
            "save" => match parts.next() {
                Some(path) => match save_snapshot_to_json(&snapshot, path) {
                    Ok(()) => println!("Saved snapshot to {path}."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: save <json_path>"),
            },
            "import" => match parts.next() {
                Some(path) => match load_appointments_from_csv(path) {
                    Ok(appointments) => {
                        let count = snapshot.merge_appointments(appointments);
                        println!("Imported {count} appointments.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: import <csv_path>"),
            },
            "config" => match parts.next() {
                Some(path) => match EngineConfig::load_from_json(path) {
                    Ok(config) => {
                        resolver = AvailabilityResolver::new(config);
                        println!("Engine settings loaded.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: config <json_path>"),
            },
            "workers" => print_workers(&snapshot),
            "check" => {
                let worker_s = parts.next();
                let start = parts.next().and_then(parse_datetime);
                let end = parts.next().and_then(parse_datetime);
                let (Some(worker_id), Some(start), Some(end)) = (worker_s, start, end) else {
                    println!("Usage: check <worker_id> <YYYY-MM-DDTHH:MM> <YYYY-MM-DDTHH:MM>");
                    continue;
                };
                let Some(worker) = snapshot.find_worker(worker_id) else {
                    println!("Worker {worker_id} not found.");
                    continue;
                };
                match resolver.check(worker, start, end) {
                    Ok(result) if result.available => match result.reason {
                        Some(reason) => println!("available: {reason}"),
                        None => println!("available"),
                    },
                    Ok(result) => println!(
                        "unavailable: {}",
                        result.reason.unwrap_or_default()
                    ),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "conflicts" => {
                let worker_s = parts.next();
                let start = parts.next().and_then(parse_datetime);
                let end = parts.next().and_then(parse_datetime);
                let exclude = parts.next();
                let (Some(worker_id), Some(start), Some(end)) = (worker_s, start, end) else {
                    println!(
                        "Usage: conflicts <worker_id> <YYYY-MM-DDTHH:MM> <YYYY-MM-DDTHH:MM> [exclude_id]"
                    );
                    continue;
                };
                match ConflictChecker::new(&snapshot.appointments).check(
                    worker_id, start, end, exclude,
                ) {
                    Ok(result) if result.conflict => {
                        println!("conflict: {}", result.reason.unwrap_or_default())
                    }
                    Ok(_) => println!("no conflict"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "dispatch" => {
                let start = parts.next().and_then(parse_datetime);
                let end = parts.next().and_then(parse_datetime);
                let (Some(start), Some(end)) = (start, end) else {
                    println!("Usage: dispatch <YYYY-MM-DDTHH:MM> <YYYY-MM-DDTHH:MM>");
                    continue;
                };
                let board = DispatchBoard::new(&resolver, &snapshot.appointments);
                match board
                    .candidates(&snapshot.workers, start, end, None)
                    .map_err(|e| e.to_string())
                    .and_then(|c| dispatch_frame(&c).map_err(|e| e.to_string()))
                {
                    Ok(df) => println!("{}", render_text_table(&df)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "cpm" => {
                let Some(project) = find_project(&snapshot, parts.next()) else {
                    continue;
                };
                match compute_critical_path(&project.tasks, &project.dependencies) {
                    Ok(result) => {
                        println!("Project duration: {} days", result.project_duration);
                        println!("Critical path: {}", result.critical_chain().join(" -> "));
                        for task in &project.tasks {
                            if let Some(slack) = result.slack(&task.id) {
                                println!("  {:<12} slack {}", task.id, slack);
                            }
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "gantt" => {
                let Some(project) = find_project(&snapshot, parts.next()) else {
                    continue;
                };
                let requested = (
                    parts.next().and_then(parse_date),
                    parts.next().and_then(parse_date),
                );
                let bounds = match requested {
                    (Some(start), Some(end)) => Some((start, end)),
                    _ => chart_bounds(&project.tasks),
                };
                let Some((chart_start, chart_end)) = bounds else {
                    println!("Project {} has no tasks.", project.id);
                    continue;
                };
                let cpm = match compute_critical_path(&project.tasks, &project.dependencies) {
                    Ok(cpm) => cpm,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                match project_layout(chart_start, chart_end, &project.tasks, Some(&cpm)) {
                    Ok(layout) => {
                        println!(
                            "Chart {} .. {} ({} days)",
                            layout.chart_start, layout.chart_end, layout.total_days
                        );
                        for bar in &layout.bars {
                            println!(
                                "  {:<12} left {:>6.2}% width {:>6.2}%{}",
                                bar.task_id,
                                bar.left_pct,
                                bar.width_pct,
                                if bar.is_critical { " *" } else { "" }
                            );
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "report" => {
                let Some(project) = find_project(&snapshot, parts.next()) else {
                    continue;
                };
                let cpm = match compute_critical_path(&project.tasks, &project.dependencies) {
                    Ok(cpm) => cpm,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let layout = chart_bounds(&project.tasks)
                    .and_then(|(s, e)| project_layout(s, e, &project.tasks, Some(&cpm)).ok());
                match schedule_frame(&project.tasks, &cpm, layout.as_ref()) {
                    Ok(df) => println!("{}", render_text_table(&df)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help' for a list of commands.");
            }
        }
    }
}
