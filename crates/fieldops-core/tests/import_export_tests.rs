use chrono::NaiveDateTime;
use fieldops_schedule::{
    AppointmentSource, AppointmentStatus, AvailabilityResolver, FieldOpsSnapshot,
    PersistenceError, ProjectSource, WorkerDirectory, compute_critical_path,
    load_appointments_from_csv, load_snapshot_from_json, save_appointments_to_csv,
    save_snapshot_to_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{
  "workers": [
    { "id": "w1", "name": "Ana Ruiz" },
    { "id": "w2", "name": "Bo Chen" }
  ],
  "worker_schedules": [
    { "worker_id": "w1", "day_of_week": 1, "start_time": "08:00:00", "end_time": "17:00:00" },
    { "worker_id": "w2", "day_of_week": 2, "start_time": "07:30", "end_time": "15:30", "is_active": true }
  ],
  "worker_unavailability": [
    { "id": "u1", "worker_id": "w1", "start_date": "2024-05-13", "end_date": "2024-05-14", "reason": "Annual leave" }
  ],
  "seasonal_availability": [
    { "id": "s1", "worker_id": "w2", "season_name": "Summer",
      "start_date": "2024-12-01", "end_date": "2024-12-31", "created_at": "2024-10-01T09:00:00" }
  ],
  "seasonal_date_overrides": [
    { "seasonal_availability_id": "s1", "date": "2024-12-15", "periods": ["morning"] }
  ],
  "appointments": [
    { "id": "apt-1", "title": "Boiler service", "assigned_to": "w1",
      "start_time": "2024-05-06T10:00:00", "end_time": "2024-05-06T12:00:00",
      "status": "scheduled", "site_lat": -33.8688, "site_lng": 151.2093 }
  ],
  "projects": [ { "id": "p1", "name": "Kitchen refit" } ],
  "project_tasks": [
    { "id": "a", "project_id": "p1", "name": "Strip out", "start_date": "2024-01-01", "end_date": "2024-01-02" },
    { "id": "b", "project_id": "p1", "name": "First fix", "start_date": "2024-01-03", "end_date": "2024-01-05",
      "status": "in_progress", "progress_percentage": 40 }
  ],
  "task_dependencies": [
    { "task_id": "b", "depends_on_task_id": "a", "dependency_type": "finish_to_start" }
  ]
}"#;

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn snapshot_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn snapshot_loads_and_feeds_the_engine() {
    let file = snapshot_file(SNAPSHOT);
    let snapshot = load_snapshot_from_json(file.path()).unwrap();

    assert_eq!(snapshot.workers.len(), 2);
    let bo = snapshot.worker("w2").unwrap().unwrap();
    assert_eq!(bo.seasonal_windows[0].name, "Summer");

    let resolver = AvailabilityResolver::default();
    let result = resolver
        .check(&bo, dt("2024-12-15 09:00"), dt("2024-12-15 10:00"))
        .unwrap();
    assert!(result.available);

    let ana_jobs = snapshot.appointments_for_worker("w1").unwrap();
    assert_eq!(ana_jobs.len(), 1);
    assert!(ana_jobs[0].site.is_some());

    let tasks = snapshot.tasks("p1").unwrap();
    let deps = snapshot.dependencies("p1").unwrap();
    assert_eq!(tasks[1].progress, 40);
    let cpm = compute_critical_path(&tasks, &deps).unwrap();
    assert_eq!(cpm.project_duration, 5);

    assert!(snapshot.tasks("nope").unwrap().is_empty());
}

#[test]
fn snapshot_round_trips_through_json() {
    let file = snapshot_file(SNAPSHOT);
    let snapshot = load_snapshot_from_json(file.path()).unwrap();

    let out = NamedTempFile::new().unwrap();
    save_snapshot_to_json(&snapshot, out.path()).unwrap();
    let reloaded = load_snapshot_from_json(out.path()).unwrap();
    assert_eq!(reloaded, snapshot);
}

#[test]
fn malformed_record_is_rejected_at_load() {
    let bad = SNAPSHOT.replace(r#""day_of_week": 2"#, r#""day_of_week": 9"#);
    let file = snapshot_file(&bad);
    let err = load_snapshot_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err}");

    let bad = SNAPSHOT.replace(r#"["morning"]"#, r#"["brunch"]"#);
    let file = snapshot_file(&bad);
    let err = load_snapshot_from_json(file.path()).unwrap_err();
    assert!(err.to_string().contains("brunch"), "{err}");
}

#[test]
fn duplicate_appointment_ids_are_rejected_at_load() {
    let duplicated = SNAPSHOT.replace(
        r#""appointments": [
    {"#,
        r#""appointments": [
    { "id": "apt-1", "title": "Gas check", "assigned_to": "w2",
      "start_time": "2024-05-07T10:00:00", "end_time": "2024-05-07T11:00:00" },
    {"#,
    );
    assert_ne!(duplicated, SNAPSHOT);
    let file = snapshot_file(&duplicated);
    let err = load_snapshot_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err}");
    assert!(err.to_string().contains("duplicate appointment id 'apt-1'"), "{err}");
}

#[test]
fn out_of_range_lag_is_rejected_at_load() {
    let bad = SNAPSHOT.replace(
        r#""dependency_type": "finish_to_start" }"#,
        r#""dependency_type": "finish_to_start", "lag_days": 9223372036854775807 }"#,
    );
    assert_ne!(bad, SNAPSHOT);
    let file = snapshot_file(&bad);
    let err = load_snapshot_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err}");

    let ok = SNAPSHOT.replace(
        r#""dependency_type": "finish_to_start" }"#,
        r#""dependency_type": "finish_to_start", "lag_days": 36500 }"#,
    );
    let file = snapshot_file(&ok);
    let snapshot = load_snapshot_from_json(file.path()).unwrap();
    assert_eq!(snapshot.dependencies("p1").unwrap()[0].lag_days, 36_500);
}

#[test]
fn appointments_round_trip_through_csv() {
    let file = snapshot_file(SNAPSHOT);
    let snapshot = load_snapshot_from_json(file.path()).unwrap();

    let csv_file = NamedTempFile::new().unwrap();
    save_appointments_to_csv(&snapshot.appointments, csv_file.path()).unwrap();
    let loaded = load_appointments_from_csv(csv_file.path()).unwrap();
    assert_eq!(loaded, snapshot.appointments);
}

#[test]
fn csv_import_accepts_blank_optionals_and_reports_bad_rows() {
    let csv = "id,title,assigned_to,start_time,end_time,status,site_lat,site_lng\n\
               apt-9,Meter read,,2024-05-07T09:00:00,2024-05-07T09:30:00,draft,,\n";
    let file = snapshot_file(csv);
    let loaded = load_appointments_from_csv(file.path()).unwrap();
    assert_eq!(loaded[0].worker_id, None);
    assert_eq!(loaded[0].status, AppointmentStatus::Draft);
    assert_eq!(loaded[0].site, None);

    let csv = "id,title,assigned_to,start_time,end_time,status,site_lat,site_lng\n\
               apt-9,Meter read,w1,2024-05-07T09:00:00,2024-05-07T09:30:00,postponed,,\n";
    let file = snapshot_file(csv);
    let err = load_appointments_from_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("row 1"), "{err}");
}

#[test]
fn merge_replaces_by_id() {
    let file = snapshot_file(SNAPSHOT);
    let mut snapshot: FieldOpsSnapshot = load_snapshot_from_json(file.path()).unwrap();
    let mut moved = snapshot.appointments[0].clone();
    moved.start = dt("2024-05-06 13:00");
    moved.end = dt("2024-05-06 14:00");
    snapshot.merge_appointments(vec![moved]);
    assert_eq!(snapshot.appointments.len(), 1);
    assert_eq!(snapshot.appointments[0].start, dt("2024-05-06 13:00"));
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use fieldops_schedule::{SnapshotStore, SqliteStore};

    #[test]
    fn sqlite_store_round_trip() {
        let file = snapshot_file(SNAPSHOT);
        let snapshot = load_snapshot_from_json(file.path()).unwrap();

        let db = NamedTempFile::new().unwrap();
        let store = SqliteStore::new(db.path()).unwrap();
        assert!(store.load_snapshot().unwrap().is_none());

        store.save_snapshot(&snapshot).unwrap();
        assert_eq!(store.load_snapshot().unwrap(), Some(snapshot.clone()));

        assert_eq!(store.worker("w1").unwrap().unwrap().name, "Ana Ruiz");
        assert!(store.worker("nobody").unwrap().is_none());
        assert_eq!(store.appointments_for_worker("w1").unwrap().len(), 1);
        assert!(store.appointments_for_worker("w2").unwrap().is_empty());
        assert_eq!(store.tasks("p1").unwrap().len(), 2);
        assert_eq!(store.dependencies("p1").unwrap().len(), 1);
    }

    #[test]
    fn saving_again_replaces_previous_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let file = snapshot_file(SNAPSHOT);
        let mut snapshot = load_snapshot_from_json(file.path()).unwrap();
        store.save_snapshot(&snapshot).unwrap();

        snapshot.workers.truncate(1);
        store.save_snapshot(&snapshot).unwrap();
        assert_eq!(store.workers().unwrap().len(), 1);
    }

    #[test]
    fn directory_reads_reject_corrupted_worker_rows() {
        let db = NamedTempFile::new().unwrap();
        let store = SqliteStore::new(db.path()).unwrap();
        let file = snapshot_file(SNAPSHOT);
        let snapshot = load_snapshot_from_json(file.path()).unwrap();
        store.save_snapshot(&snapshot).unwrap();

        let mut ana = snapshot.workers[0].clone();
        let monday = ana.weekly_schedule[0].clone();
        ana.weekly_schedule.push(monday);
        let raw = rusqlite::Connection::open(db.path()).unwrap();
        raw.execute(
            "UPDATE workers SET worker_json = ?1 WHERE id = 'w1'",
            [serde_json::to_string(&ana).unwrap()],
        )
        .unwrap();

        assert!(matches!(
            store.worker("w1"),
            Err(PersistenceError::Validation(_))
        ));
        assert!(matches!(
            store.workers(),
            Err(PersistenceError::Validation(_))
        ));
        assert!(store.load_snapshot().is_err());
        assert!(store.worker("w2").unwrap().is_some());
    }
}
