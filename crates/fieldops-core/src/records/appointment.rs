use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Appointment, AppointmentStatus, GeoPoint};

fn default_status() -> String {
    AppointmentStatus::Scheduled.as_str().to_string()
}

/// Flat appointment row, as found in the snapshot file and the CSV import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub site_lat: Option<f64>,
    #[serde(default)]
    pub site_lng: Option<f64>,
}

impl TryFrom<&AppointmentRecord> for Appointment {
    type Error = ValidationError;

    fn try_from(record: &AppointmentRecord) -> Result<Self, Self::Error> {
        let worker_id = record
            .assigned_to
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let status: AppointmentStatus = record.status.parse()?;

        let site = match (record.site_lat, record.site_lng) {
            (Some(lat), Some(lng)) => {
                let point = GeoPoint::new(lat, lng);
                if !point.is_valid() {
                    return Err(ValidationError::Invalid(format!(
                        "appointment {} has out-of-range site coordinates ({lat}, {lng})",
                        record.id
                    )));
                }
                Some(point)
            }
            _ => None,
        };

        let mut appointment = Appointment::new(
            record.id.clone(),
            record.title.clone(),
            worker_id,
            record.start_time,
            record.end_time,
        )
        .with_status(status);
        appointment.site = site;
        Ok(appointment)
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.clone(),
            title: appointment.title.clone(),
            assigned_to: appointment.worker_id.clone(),
            start_time: appointment.start,
            end_time: appointment.end,
            status: appointment.status.as_str().to_string(),
            site_lat: appointment.site.map(|p| p.lat),
            site_lng: appointment.site.map(|p| p.lng),
        }
    }
}
