//! Embedded SQLite patient store.
//!
//! [`LocalStore`] answers the same collection contract as the REST API,
//! including its status semantics (404 on a missing patient, 409 on a
//! duplicate patient ID, 422 on an invalid record), so the view-models can
//! run against it without a server.

mod patients;
mod schema;

pub use schema::*;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;
use thiserror::Error;

use crate::client::{ClientError, ClientResult, PatientCollection};
use crate::models::{Patient, PatientInput, PatientUpdate, QueryState, ResultPage};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ClientError::status(404, msg),
            StoreError::Conflict(msg) => ClientError::status(409, msg),
            StoreError::Invalid(msg) => ClientError::status(422, msg),
            other => ClientError::status(500, format!("Storage error: {}", other)),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::Lock(e.to_string())
    }
}

/// SQLite-backed patient collection.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open store at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::initialize(Connection::open(path)?)
    }

    /// Create in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock()?)
    }
}

#[async_trait]
impl PatientCollection for LocalStore {
    async fn list(&self, query: &QueryState) -> ClientResult<ResultPage> {
        let (items, total) = self.search_patients(query)?;
        Ok(ResultPage::new(items, total, query.page, query.page_size))
    }

    async fn get(&self, patient_id: &str) -> ClientResult<Patient> {
        self.get_patient(patient_id)?
            .ok_or_else(|| ClientError::status(404, not_found_message(patient_id)))
    }

    async fn create(&self, input: &PatientInput) -> ClientResult<Patient> {
        Ok(self.insert_patient(input)?)
    }

    async fn update(&self, patient_id: &str, changes: &PatientUpdate) -> ClientResult<Patient> {
        Ok(self.update_patient(patient_id, changes)?)
    }

    async fn delete(&self, patient_id: &str) -> ClientResult<()> {
        if self.delete_patient(patient_id)? {
            Ok(())
        } else {
            Err(ClientError::status(404, not_found_message(patient_id)))
        }
    }
}

pub(crate) fn not_found_message(patient_id: &str) -> String {
    format!("Patient with ID '{}' not found", patient_id)
}

pub(crate) fn conflict_message(patient_id: &str) -> String {
    format!("Patient with ID '{}' already exists", patient_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let store = LocalStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let store = LocalStore::open_in_memory().unwrap();
        let conn = store.conn().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        {
            let store = LocalStore::open(&path).unwrap();
            store.conn().unwrap().execute_batch(SCHEMA).unwrap();
        }

        assert!(path.exists());
        assert!(LocalStore::open(&path).is_ok());
    }

    #[test]
    fn test_store_error_maps_to_status() {
        let err: ClientError = StoreError::NotFound(not_found_message("P1")).into();
        assert_eq!(err.http_status(), Some(404));
        assert_eq!(err.to_string(), "Patient with ID 'P1' not found");

        let err: ClientError = StoreError::Conflict(conflict_message("P1")).into();
        assert_eq!(err.http_status(), Some(409));

        let err: ClientError = StoreError::Invalid("name: Name is required.".into()).into();
        assert_eq!(err.http_status(), Some(422));
    }
}
