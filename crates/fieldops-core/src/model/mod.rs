pub mod appointment;
pub mod period;
pub mod project;
pub mod worker;

pub use appointment::{Appointment, AppointmentId, AppointmentStatus, GeoPoint};
pub use period::{ClockRange, DayPeriod, PeriodSet};
pub use project::{
    Dependency, DependencyType, MAX_LAG_DAYS, Project, ProjectId, Task, TaskId, TaskStatus,
};
pub use worker::{
    SeasonalDateOverride, SeasonalWindow, UnavailabilityPeriod, WeeklyScheduleEntry, WorkerId,
    WorkerProfile,
};
