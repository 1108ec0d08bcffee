//! Registration and edit form view-models.
//!
//! Both forms hold a [`PatientDraft`](crate::models::PatientDraft), validate
//! it on submit and refuse a second submission while one is in flight.
//! Submission is split into `begin_submit` / `finish_submit` so a caller can
//! run the request on its own executor; `submit` does both.

mod edit;
mod registration;

pub use edit::*;
pub use registration::*;

use thiserror::Error;

use crate::client::ClientError;
use crate::validation::ValidationErrors;

/// Form submission errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Client-side validation failed; nothing was sent
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error("A submission is already in progress")]
    Busy,

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type FormResult<T> = Result<T, FormError>;

/// Outcome line shown under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Parse an age field; blank or non-numeric input is `None`.
pub fn parse_age(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
