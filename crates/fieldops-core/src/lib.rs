pub mod availability;
pub mod calculations;
pub mod config;
pub mod conflicts;
pub mod dispatch;
pub mod error;
pub mod gantt;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
#[cfg(any(feature = "cli_api", feature = "http_api"))]
pub mod logging;
pub mod model;
pub mod persistence;
pub mod records;
pub mod report;

pub use availability::{
    AvailabilityQuery, AvailabilityResolver, AvailabilityResult, AvailabilityRule,
    AvailabilitySource, RuleOutcome, SeasonalOverlap, validate_seasonal_windows,
};
pub use calculations::{CriticalPathResult, TaskDates, TaskTiming, compute_critical_path};
pub use config::{ConfigError, EngineConfig, PeriodClock, SeasonalPrecedence, ServerConfig};
pub use conflicts::{ConflictChecker, ConflictResult, intervals_overlap};
pub use dispatch::{DispatchBoard, DispatchCandidate};
pub use error::{ScheduleError, ValidationError};
pub use gantt::{GanttBar, GanttLayout, chart_bounds, project_layout};
pub use model::{
    Appointment, AppointmentStatus, DayPeriod, Dependency, DependencyType, GeoPoint, PeriodSet,
    Project, SeasonalWindow, Task, TaskStatus, UnavailabilityPeriod, WeeklyScheduleEntry,
    WorkerProfile,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    AppointmentSource, FieldOpsSnapshot, PersistenceError, PersistenceResult, ProjectSource,
    SnapshotStore, WorkerDirectory, load_appointments_from_csv, load_snapshot_from_json,
    save_appointments_to_csv, save_snapshot_to_json,
};
pub use records::SnapshotRecords;
pub use report::{dispatch_frame, render_text_table, schedule_frame};
