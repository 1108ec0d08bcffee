//! Patient Registry Core Library
//!
//! Client-side logic for a patient registry backed by a REST API.
//!
//! # Architecture
//!
//! ```text
//!   user intent (search / sort / page / delete)      register / edit
//!                  │                                       │
//!                  ▼                                       ▼
//!          ListViewModel ──FetchCommand(seq)──┐     RegistrationForm / EditForm
//!                  ▲                          │            │
//!          apply(FetchOutcome)                │     validate_patient
//!          (stale seq dropped)                │            │
//!                  │                          ▼            ▼
//!                  └──────────────── PatientCollection ◄───┘
//!                                    │               │
//!                             HttpPatientClient   LocalStore
//!                              (GET/POST/PUT/     (SQLite)
//!                               DELETE /patients)
//! ```
//!
//! # Core Principle
//!
//! **The list always shows the answer to the most recent request.** Responses
//! to superseded requests are discarded, whatever order they arrive in.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, QueryState, ResultPage, etc.)
//! - [`validation`]: Field-by-field draft validation
//! - [`client`]: Collection contract and the REST client
//! - [`store`]: SQLite implementation of the collection contract
//! - [`list`]: List view-model and its async controller
//! - [`forms`]: Registration and edit form view-models
//! - [`config`]: Client configuration from environment

pub mod client;
pub mod config;
pub mod forms;
pub mod list;
pub mod models;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use client::{ClientError, ClientResult, ErrorKind, HttpPatientClient, PatientCollection};
pub use config::ClientConfig;
pub use forms::{EditForm, FormError, Notice, RegistrationForm};
pub use list::{ListController, ListDisplay, ListViewModel};
pub use models::{
    Gender, Patient, PatientDraft, PatientInput, PatientUpdate, QueryState, ResultPage,
    SortField, SortOrder,
};
pub use store::LocalStore;
pub use validation::{validate_patient, FieldError, PatientField};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

// =========================================================================
// Collection Sources
// =========================================================================

/// Where patient records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// REST API at the configured base URL
    Remote(ClientConfig),
    /// SQLite file, created if missing
    Local(PathBuf),
}

// =========================================================================
// Factory Functions
// =========================================================================

/// Open a collection for the given source.
pub fn open_collection(source: &Source) -> ClientResult<Arc<dyn PatientCollection>> {
    debug!(?source, "opening patient collection");
    let collection: Arc<dyn PatientCollection> = match source {
        Source::Remote(config) => Arc::new(HttpPatientClient::new(config)?),
        Source::Local(path) => Arc::new(LocalStore::open(path)?),
    };
    Ok(collection)
}
