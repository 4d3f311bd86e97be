use fieldops_schedule::model::{AppointmentId, WorkerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostError {
    #[error("time log {0} has no clock-out")]
    OpenTimeLog(String),

    #[error("time log {id} clocks out before it clocks in")]
    InvalidInterval { id: String },

    #[error("time log {id} has negative hourly rate {rate_cents}")]
    NegativeRate { id: String, rate_cents: i64 },

    #[error("time log {id} has invalid overhead percentage {overhead_pct}")]
    InvalidOverhead { id: String, overhead_pct: f64 },

    #[error("time log {log_id} references unknown appointment {appointment_id}")]
    UnknownAppointment {
        log_id: String,
        appointment_id: AppointmentId,
    },

    #[error("time log {log_id} for worker {worker_id} is not assigned to appointment {appointment_id}")]
    WorkerMismatch {
        log_id: String,
        worker_id: WorkerId,
        appointment_id: AppointmentId,
    },

    #[error("amount overflows the cent range")]
    Overflow,

    #[error("io error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cost config: {0}")]
    Config(String),

    #[error("invalid cost config json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CostResult<T> = Result<T, CostError>;
