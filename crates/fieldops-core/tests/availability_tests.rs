use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use fieldops_schedule::{
    AvailabilityResolver, AvailabilitySource, DayPeriod, EngineConfig, PeriodSet,
    SeasonalPrecedence, SeasonalWindow, UnavailabilityPeriod, ValidationError,
    WeeklyScheduleEntry, WorkerProfile,
};

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn weekday_worker() -> WorkerProfile {
    let mut worker = WorkerProfile::new("w1", "Ana Ruiz");
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        worker = worker.with_weekly(WeeklyScheduleEntry::new(day, hm(8, 0), hm(17, 0)));
    }
    worker
}

fn summer() -> SeasonalWindow {
    SeasonalWindow::new("s1", "Summer", date(2024, 12, 1), date(2024, 12, 31))
        .with_override(date(2024, 12, 15), [DayPeriod::Morning])
}

#[test]
fn summer_override_allows_morning_only() {
    // 2024-12-15 is a Sunday and the worker has no weekly hours at all
    let worker = WorkerProfile::new("w1", "Ana Ruiz").with_season(summer());
    let resolver = AvailabilityResolver::default();

    let morning = resolver
        .check(&worker, dt("2024-12-15 09:00"), dt("2024-12-15 10:00"))
        .unwrap();
    assert!(morning.available);
    assert_eq!(morning.source, AvailabilitySource::Seasonal);

    let afternoon = resolver
        .check(&worker, dt("2024-12-15 14:00"), dt("2024-12-15 15:00"))
        .unwrap();
    assert!(!afternoon.available);
    let reason = afternoon.reason.unwrap();
    assert!(reason.contains("Summer"), "{reason}");
    assert!(reason.contains("Morning (06:00-12:00)"), "{reason}");
}

#[test]
fn override_denying_every_period_ignores_weekly_hours() {
    // Monday inside the season, normally a working day
    let window = SeasonalWindow::new("s1", "Summer", date(2024, 12, 1), date(2024, 12, 31))
        .with_override(date(2024, 12, 16), PeriodSet::new());
    let worker = weekday_worker().with_season(window);

    let result = AvailabilityResolver::default()
        .check(&worker, dt("2024-12-16 09:00"), dt("2024-12-16 10:00"))
        .unwrap();
    assert!(!result.available);
    assert_eq!(result.source, AvailabilitySource::Seasonal);
    assert_eq!(
        result.reason.as_deref(),
        Some("Not available on this date (Summer availability)")
    );
}

#[test]
fn covered_date_without_override_is_unavailable() {
    let worker = weekday_worker().with_season(summer());
    let result = AvailabilityResolver::default()
        .check(&worker, dt("2024-12-17 09:00"), dt("2024-12-17 10:00"))
        .unwrap();
    assert!(!result.available);
    assert_eq!(result.source, AvailabilitySource::Seasonal);
}

#[test]
fn seasonal_decision_skips_unavailability() {
    let worker = WorkerProfile::new("w1", "Ana Ruiz")
        .with_season(summer())
        .with_unavailability(UnavailabilityPeriod::all_day(
            "u1",
            date(2024, 12, 15),
            date(2024, 12, 15),
        ));
    let result = AvailabilityResolver::default()
        .check(&worker, dt("2024-12-15 09:00"), dt("2024-12-15 10:00"))
        .unwrap();
    assert!(result.available);
}

#[test]
fn day_level_request_matches_any_allowed_period() {
    let window = SeasonalWindow::new("s1", "Winter", date(2025, 1, 1), date(2025, 1, 31))
        .with_override(date(2025, 1, 10), [DayPeriod::Morning, DayPeriod::Evening]);
    let worker = WorkerProfile::new("w1", "Ana Ruiz").with_season(window);

    let result = AvailabilityResolver::default()
        .check(&worker, dt("2025-01-10 08:00"), dt("2025-01-10 16:00"))
        .unwrap();
    assert!(result.available);
    assert_eq!(
        result.reason.as_deref(),
        Some("Available during Winter: Morning, Evening")
    );
}

#[test]
fn anytime_override_accepts_any_window() {
    let window = SeasonalWindow::new("s1", "Festival", date(2025, 3, 1), date(2025, 3, 2))
        .with_override(date(2025, 3, 1), [DayPeriod::Anytime]);
    let worker = WorkerProfile::new("w1", "Ana Ruiz").with_season(window);

    let result = AvailabilityResolver::default()
        .check(&worker, dt("2025-03-01 22:00"), dt("2025-03-01 23:30"))
        .unwrap();
    assert!(result.available);
    assert!(
        result
            .available_periods
            .is_some_and(|periods| periods.contains(DayPeriod::Anytime))
    );
}

#[test]
fn weekly_schedule_rejects_days_off_and_out_of_hours() {
    let worker = weekday_worker();
    let resolver = AvailabilityResolver::default();

    // 2024-05-11 is a Saturday
    let saturday = resolver
        .check(&worker, dt("2024-05-11 09:00"), dt("2024-05-11 10:00"))
        .unwrap();
    assert_eq!(
        saturday.reason.as_deref(),
        Some("Worker does not work on Saturday")
    );

    let late = resolver
        .check(&worker, dt("2024-05-06 16:30"), dt("2024-05-06 17:30"))
        .unwrap();
    assert!(!late.available);
    assert_eq!(
        late.reason.as_deref(),
        Some("Outside working hours (08:00 - 17:00)")
    );

    let edge = resolver
        .check(&worker, dt("2024-05-06 08:00"), dt("2024-05-06 17:00"))
        .unwrap();
    assert!(edge.available);
    assert_eq!(edge.source, AvailabilitySource::Default);
}

#[test]
fn window_running_past_midnight_is_outside_hours() {
    let worker = weekday_worker();
    let result = AvailabilityResolver::default()
        .check(&worker, dt("2024-05-06 16:00"), dt("2024-05-07 09:00"))
        .unwrap();
    assert!(!result.available);
    assert_eq!(result.source, AvailabilitySource::WeeklySchedule);
}

#[test]
fn unavailability_blocks_whole_days_and_contained_windows() {
    let mut dentist = UnavailabilityPeriod::all_day("u2", date(2024, 5, 7), date(2024, 5, 7));
    dentist.start_time = Some(hm(10, 0));
    dentist.end_time = Some(hm(12, 0));
    dentist.reason = Some("Dentist".into());
    let worker = weekday_worker()
        .with_unavailability(UnavailabilityPeriod::all_day(
            "u1",
            date(2024, 5, 6),
            date(2024, 5, 6),
        ))
        .with_unavailability(dentist);
    let resolver = AvailabilityResolver::default();

    let leave = resolver
        .check(&worker, dt("2024-05-06 09:00"), dt("2024-05-06 10:00"))
        .unwrap();
    assert_eq!(leave.reason.as_deref(), Some("Worker is unavailable"));
    assert_eq!(leave.source, AvailabilitySource::Unavailability);

    let inside = resolver
        .check(&worker, dt("2024-05-07 10:30"), dt("2024-05-07 11:30"))
        .unwrap();
    assert_eq!(inside.reason.as_deref(), Some("Worker is unavailable: Dentist"));

    // straddles the exception, so only partially covered
    let straddle = resolver
        .check(&worker, dt("2024-05-07 11:00"), dt("2024-05-07 13:00"))
        .unwrap();
    assert!(straddle.available);
}

#[test]
fn overlapping_windows_follow_configured_precedence() {
    let mut older = SeasonalWindow::new("s-old", "Spring", date(2025, 4, 1), date(2025, 4, 30))
        .with_override(date(2025, 4, 10), [DayPeriod::Morning]);
    older.created_at = Some(dt("2025-01-01 00:00"));
    let mut newer = SeasonalWindow::new("s-new", "Easter", date(2025, 4, 5), date(2025, 4, 20))
        .with_override(date(2025, 4, 10), [DayPeriod::Afternoon]);
    newer.created_at = Some(dt("2025-02-01 00:00"));
    let worker = WorkerProfile::new("w1", "Ana Ruiz")
        .with_season(older)
        .with_season(newer);
    let start = dt("2025-04-10 13:00");
    let end = dt("2025-04-10 14:00");

    let recent = AvailabilityResolver::default()
        .check(&worker, start, end)
        .unwrap();
    assert!(recent.available);

    let config = EngineConfig {
        seasonal_precedence: SeasonalPrecedence::FirstInOrder,
        ..EngineConfig::default()
    };
    let first = AvailabilityResolver::new(config)
        .check(&worker, start, end)
        .unwrap();
    assert!(!first.available);
    assert!(first.reason.unwrap().contains("Spring"));
}

#[test]
fn malformed_requests_are_validation_errors() {
    let resolver = AvailabilityResolver::default();
    let worker = weekday_worker();
    let start = dt("2024-05-06 10:00");

    assert_eq!(
        resolver.check(&worker, start, start),
        Err(ValidationError::EmptyInterval { start, end: start })
    );
    let nameless = WorkerProfile::new("  ", "Nobody");
    assert_eq!(
        resolver.check(&nameless, start, dt("2024-05-06 11:00")),
        Err(ValidationError::MissingWorkerId)
    );
}

#[test]
fn default_chain_order() {
    assert_eq!(
        AvailabilityResolver::default().rule_names(),
        vec!["seasonal", "weekly_schedule", "unavailability"]
    );
}
