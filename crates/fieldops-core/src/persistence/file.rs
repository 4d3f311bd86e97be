use std::fs::File;
use std::path::Path;

use tracing::info;

use super::{FieldOpsSnapshot, PersistenceError, PersistenceResult};
use crate::model::Appointment;
use crate::records::{AppointmentRecord, SnapshotRecords};

/// Writes the snapshot as raw record tables.
pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &FieldOpsSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot.to_records())?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<FieldOpsSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records: SnapshotRecords = serde_json::from_reader(file)?;
    let snapshot = FieldOpsSnapshot::from_records(&records)?;
    info!(
        path = %path.display(),
        workers = snapshot.workers.len(),
        appointments = snapshot.appointments.len(),
        projects = snapshot.projects.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

pub fn save_appointments_to_csv<P: AsRef<Path>>(
    appointments: &[Appointment],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for appointment in appointments {
        writer.serialize(AppointmentRecord::from(appointment))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads appointment rows; the first bad row aborts the import with its
/// line number.
pub fn load_appointments_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Appointment>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut appointments = Vec::new();
    for (row, record) in reader.deserialize::<AppointmentRecord>().enumerate() {
        let record = record?;
        let appointment = Appointment::try_from(&record).map_err(|err| {
            PersistenceError::InvalidData(format!("appointment row {}: {err}", row + 1))
        })?;
        appointments.push(appointment);
    }
    Ok(appointments)
}
