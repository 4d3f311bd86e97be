#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{
  "workers": [ { "id": "w1", "name": "Ana Ruiz" } ],
  "worker_schedules": [
    { "worker_id": "w1", "day_of_week": 1, "start_time": "08:00", "end_time": "17:00" }
  ],
  "seasonal_availability": [
    { "id": "s1", "worker_id": "w1", "season_name": "Summer",
      "start_date": "2024-12-01", "end_date": "2024-12-31" }
  ],
  "seasonal_date_overrides": [
    { "seasonal_availability_id": "s1", "date": "2024-12-15", "periods": ["morning"] }
  ],
  "appointments": [
    { "id": "apt-1", "title": "Boiler service", "assigned_to": "w1",
      "start_time": "2024-05-06T10:00:00", "end_time": "2024-05-06T12:00:00" }
  ],
  "projects": [ { "id": "p1", "name": "Kitchen refit" } ],
  "project_tasks": [
    { "id": "a", "project_id": "p1", "name": "Strip", "start_date": "2024-01-01", "end_date": "2024-01-02" },
    { "id": "b", "project_id": "p1", "name": "Fix", "start_date": "2024-01-03", "end_date": "2024-01-05" },
    { "id": "c", "project_id": "p1", "name": "Finish", "start_date": "2024-01-06", "end_date": "2024-01-10" }
  ],
  "task_dependencies": [
    { "task_id": "b", "depends_on_task_id": "a" },
    { "task_id": "c", "depends_on_task_id": "b" }
  ]
}"#;

fn snapshot_file() -> (NamedTempFile, String) {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    let path = file.path().to_string_lossy().to_string();
    (file, path)
}

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_check_reports_seasonal_reason() {
    let (_file, path) = snapshot_file();
    run_cli(&format!(
        "load {path}\ncheck w1 2024-12-15T14:00 2024-12-15T15:00\ncheck w1 2024-12-15T09:00 2024-12-15T10:00\nquit\n"
    ))
    .success()
    .stdout(str_contains("Loaded 1 workers, 1 appointments, 1 projects."))
    .stdout(str_contains("unavailable: Only available Morning (06:00-12:00)"))
    .stdout(str_contains("Summer availability"));
}

#[test]
fn cli_conflicts_names_the_booking() {
    let (_file, path) = snapshot_file();
    run_cli(&format!(
        "load {path}\nconflicts w1 2024-05-06T11:00 2024-05-06T13:00\nconflicts w1 2024-05-06T12:00 2024-05-06T13:00\nquit\n"
    ))
    .success()
    .stdout(str_contains("conflict: Conflicts with existing appointment 'Boiler service'"))
    .stdout(str_contains("no conflict"));
}

#[test]
fn cli_cpm_prints_chain() {
    let (_file, path) = snapshot_file();
    run_cli(&format!("load {path}\ncpm p1\nquit\n"))
        .success()
        .stdout(str_contains("Project duration: 10 days"))
        .stdout(str_contains("Critical path: a -> b -> c"));
}

#[test]
fn cli_gantt_and_report_render() {
    let (_file, path) = snapshot_file();
    run_cli(&format!("load {path}\ngantt p1\nreport p1\nquit\n"))
        .success()
        .stdout(str_contains("Chart 2024-01-01 .. 2024-01-10 (10 days)"))
        .stdout(str_contains("width  50.00% *"))
        .stdout(str_contains("| task_id |"));
}

#[test]
fn cli_dispatch_lists_workers() {
    let (_file, path) = snapshot_file();
    run_cli(&format!(
        "load {path}\ndispatch 2024-05-06T13:00 2024-05-06T14:00\nquit\n"
    ))
    .success()
    .stdout(str_contains("| worker_id |"))
    .stdout(str_contains("Ana Ruiz"));
}

#[test]
fn cli_gantt_reports_cyclic_projects() {
    let cyclic = SNAPSHOT.replace(
        r#"{ "task_id": "b", "depends_on_task_id": "a" }"#,
        r#"{ "task_id": "b", "depends_on_task_id": "a" },
    { "task_id": "a", "depends_on_task_id": "c" }"#,
    );
    assert_ne!(cyclic, SNAPSHOT);
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(cyclic.as_bytes()).unwrap();
    let path = file.path().to_string_lossy().to_string();

    run_cli(&format!("load {path}\ngantt p1\nquit\n"))
        .success()
        .stdout(str_contains("Error: dependency cycle detected"))
        .stdout(str_contains("Chart ").not());
}

#[test]
fn cli_usage_and_unknown_project() {
    run_cli("check w1\ncpm nope\nbogus\nquit\n")
        .success()
        .stdout(str_contains("Usage: check"))
        .stdout(str_contains("Project nope not found."))
        .stdout(str_contains("Unknown command."));
}
