//! Remote patient collection.
//!
//! [`PatientCollection`] is the CRUD contract the view-models talk to.
//! [`HttpPatientClient`] implements it over the REST API; the embedded
//! [`LocalStore`](crate::store::LocalStore) implements it over SQLite.
//! Nothing here retries: a failed call is returned to the caller as is.

mod http;

pub use http::*;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::models::{Patient, PatientInput, PatientUpdate, QueryState, ResultPage};

/// Collection client errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure; no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` is already extracted from the body
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Server,
    Network,
    Decode,
    Config,
}

impl ClientError {
    /// Build a server error carrying a status code.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ClientError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Server { status: 404, .. } => ErrorKind::NotFound,
            ClientError::Server {
                status: 400 | 422, ..
            } => ErrorKind::Validation,
            ClientError::Server { status: 409, .. } => ErrorKind::Conflict,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status, when the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// CRUD contract of the remote patient collection.
#[async_trait]
pub trait PatientCollection: Send + Sync {
    /// Fetch one page of patients for `query`.
    async fn list(&self, query: &QueryState) -> ClientResult<ResultPage>;

    /// Fetch a single patient by patient ID.
    async fn get(&self, patient_id: &str) -> ClientResult<Patient>;

    /// Create a patient; the returned record carries the surrogate key.
    async fn create(&self, input: &PatientInput) -> ClientResult<Patient>;

    /// Apply a partial update to the patient currently stored under `patient_id`.
    async fn update(&self, patient_id: &str, changes: &PatientUpdate) -> ClientResult<Patient>;

    /// Delete a patient by patient ID.
    async fn delete(&self, patient_id: &str) -> ClientResult<()>;
}

#[async_trait]
impl<T: PatientCollection + ?Sized> PatientCollection for Arc<T> {
    async fn list(&self, query: &QueryState) -> ClientResult<ResultPage> {
        (**self).list(query).await
    }

    async fn get(&self, patient_id: &str) -> ClientResult<Patient> {
        (**self).get(patient_id).await
    }

    async fn create(&self, input: &PatientInput) -> ClientResult<Patient> {
        (**self).create(input).await
    }

    async fn update(&self, patient_id: &str, changes: &PatientUpdate) -> ClientResult<Patient> {
        (**self).update(patient_id, changes).await
    }

    async fn delete(&self, patient_id: &str) -> ClientResult<()> {
        (**self).delete(patient_id).await
    }
}
