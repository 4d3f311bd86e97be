use chrono::{NaiveDateTime, NaiveTime, Weekday};
use fieldops_schedule::{
    Appointment, AvailabilityResolver, DispatchBoard, ValidationError, WeeklyScheduleEntry,
    WorkerProfile,
};

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn hm(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn crew() -> Vec<WorkerProfile> {
    vec![
        WorkerProfile::new("w3", "Cleo")
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Mon, hm(8), hm(17))),
        WorkerProfile::new("w1", "Ana")
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Mon, hm(8), hm(17))),
        WorkerProfile::new("w2", "Bo")
            .with_weekly(WeeklyScheduleEntry::new(Weekday::Tue, hm(8), hm(17))),
    ]
}

#[test]
fn candidates_are_sorted_and_classified() {
    let workers = crew();
    let appointments = vec![Appointment::new(
        "apt-1",
        "Boiler service",
        Some("w3"),
        dt("2024-05-06 09:00"),
        dt("2024-05-06 11:00"),
    )];
    let resolver = AvailabilityResolver::default();
    let board = DispatchBoard::new(&resolver, &appointments);

    let candidates = board
        .candidates(&workers, dt("2024-05-06 10:00"), dt("2024-05-06 12:00"), None)
        .unwrap();
    let names: Vec<&str> = candidates.iter().map(|c| c.worker_name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Bo", "Cleo"]);

    assert!(candidates[0].bookable);
    assert!(!candidates[1].availability.available);
    assert!(candidates[2].availability.available);
    assert!(candidates[2].conflict.conflict);
    assert!(!candidates[2].bookable);

    let bookable = board
        .bookable(&workers, dt("2024-05-06 10:00"), dt("2024-05-06 12:00"))
        .unwrap();
    assert_eq!(bookable.len(), 1);
    assert_eq!(bookable[0].worker_id, "w1");
}

#[test]
fn excluding_the_appointment_being_moved_frees_its_worker() {
    let workers = crew();
    let appointments = vec![Appointment::new(
        "apt-1",
        "Boiler service",
        Some("w3"),
        dt("2024-05-06 09:00"),
        dt("2024-05-06 11:00"),
    )];
    let resolver = AvailabilityResolver::default();
    let candidates = DispatchBoard::new(&resolver, &appointments)
        .candidates(
            &workers,
            dt("2024-05-06 10:00"),
            dt("2024-05-06 12:00"),
            Some("apt-1"),
        )
        .unwrap();
    assert!(candidates.iter().find(|c| c.worker_id == "w3").unwrap().bookable);
}

#[test]
fn empty_interval_is_rejected_once() {
    let resolver = AvailabilityResolver::default();
    let t = dt("2024-05-06 10:00");
    assert_eq!(
        DispatchBoard::new(&resolver, &[]).candidates(&crew(), t, t, None),
        Err(ValidationError::EmptyInterval { start: t, end: t })
    );
}
