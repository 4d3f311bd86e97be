use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};

use super::{
    AppointmentSource, FieldOpsSnapshot, PersistenceError, PersistenceResult, ProjectSource,
    SnapshotStore, WorkerDirectory,
};
use crate::model::{Appointment, Project, WorkerProfile};

/// Snapshot storage with one JSON document per worker, appointment and
/// project.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS workers (
                position INTEGER NOT NULL,
                id TEXT PRIMARY KEY,
                worker_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS appointments (
                position INTEGER NOT NULL,
                id TEXT PRIMARY KEY,
                worker_id TEXT,
                appointment_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS appointments_worker ON appointments (worker_id);
            CREATE TABLE IF NOT EXISTS projects (
                position INTEGER NOT NULL,
                id TEXT PRIMARY KEY,
                project_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)
    }

    fn save_workers(tx: &Transaction, workers: &[WorkerProfile]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM workers", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO workers (position, id, worker_json) VALUES (?1, ?2, ?3)")?;
        for (position, worker) in workers.iter().enumerate() {
            worker.validate()?;
            let json = serde_json::to_string(worker)?;
            stmt.execute(params![position as i64, worker.id, json])?;
        }
        Ok(())
    }

    fn save_appointments(tx: &Transaction, appointments: &[Appointment]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM appointments", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO appointments (position, id, worker_id, appointment_json) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, appointment) in appointments.iter().enumerate() {
            let json = serde_json::to_string(appointment)?;
            stmt.execute(params![
                position as i64,
                appointment.id,
                appointment.worker_id,
                json
            ])?;
        }
        Ok(())
    }

    fn save_projects(tx: &Transaction, projects: &[Project]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM projects", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO projects (position, id, project_json) VALUES (?1, ?2, ?3)")?;
        for (position, project) in projects.iter().enumerate() {
            let json = serde_json::to_string(project)?;
            stmt.execute(params![position as i64, project.id, json])?;
        }
        Ok(())
    }

    fn load_all<T: DeserializeOwned>(conn: &Connection, sql: &str) -> PersistenceResult<Vec<T>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut items = Vec::new();
        for json in rows {
            items.push(serde_json::from_str(&json?)?);
        }
        Ok(items)
    }

    fn count(conn: &Connection, table: &str) -> PersistenceResult<i64> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
    }
}

impl SnapshotStore for SqliteStore {
    fn save_snapshot(&self, snapshot: &FieldOpsSnapshot) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_workers(&tx, &snapshot.workers)?;
        Self::save_appointments(&tx, &snapshot.appointments)?;
        Self::save_projects(&tx, &snapshot.projects)?;
        tx.commit()?;
        Ok(())
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<FieldOpsSnapshot>> {
        let conn = self.lock()?;
        let stored = Self::count(&conn, "workers")?
            + Self::count(&conn, "appointments")?
            + Self::count(&conn, "projects")?;
        if stored == 0 {
            return Ok(None);
        }

        let workers: Vec<WorkerProfile> =
            Self::load_all(&conn, "SELECT worker_json FROM workers ORDER BY position")?;
        for worker in &workers {
            worker.validate()?;
        }
        Ok(Some(FieldOpsSnapshot {
            workers,
            appointments: Self::load_all(
                &conn,
                "SELECT appointment_json FROM appointments ORDER BY position",
            )?,
            projects: Self::load_all(&conn, "SELECT project_json FROM projects ORDER BY position")?,
        }))
    }
}

impl WorkerDirectory for SqliteStore {
    fn workers(&self) -> PersistenceResult<Vec<WorkerProfile>> {
        let conn = self.lock()?;
        let workers: Vec<WorkerProfile> =
            Self::load_all(&conn, "SELECT worker_json FROM workers ORDER BY position")?;
        for worker in &workers {
            worker.validate()?;
        }
        Ok(workers)
    }

    fn worker(&self, id: &str) -> PersistenceResult<Option<WorkerProfile>> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT worker_json FROM workers WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        let worker: WorkerProfile = serde_json::from_str(&json)?;
        worker.validate()?;
        Ok(Some(worker))
    }
}

impl AppointmentSource for SqliteStore {
    fn appointments(&self) -> PersistenceResult<Vec<Appointment>> {
        let conn = self.lock()?;
        Self::load_all(
            &conn,
            "SELECT appointment_json FROM appointments ORDER BY position",
        )
    }

    fn appointments_for_worker(&self, worker_id: &str) -> PersistenceResult<Vec<Appointment>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT appointment_json FROM appointments WHERE worker_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![worker_id], |row| row.get::<_, String>(0))?;
        let mut appointments = Vec::new();
        for json in rows {
            appointments.push(serde_json::from_str(&json?)?);
        }
        Ok(appointments)
    }
}

impl ProjectSource for SqliteStore {
    fn project(&self, project_id: &str) -> PersistenceResult<Option<Project>> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT project_json FROM projects WHERE id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        let project: Project = serde_json::from_str(&json)?;
        Ok(Some(project))
    }
}
