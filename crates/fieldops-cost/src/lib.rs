//! Labour costing for field appointments: time logs, check-in GPS
//! verification and draft invoices.

pub mod config;
pub mod error;
pub mod gps;
pub mod invoice;
pub mod time_log;

pub use config::{CostConfig, GpsThresholds};
pub use error::{CostError, CostResult};
pub use gps::{GpsStatus, GpsVerification, classify_distance, haversine_m, verify_check_in};
pub use invoice::{InvoiceBuilder, InvoiceDraft, InvoiceLine};
pub use time_log::{TimeLog, TimeLogCost, cost_time_log};
