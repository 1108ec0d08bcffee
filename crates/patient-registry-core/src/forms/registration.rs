//! New-patient registration form.

use tracing::{info, warn};

use super::{parse_age, FormError, FormResult, Notice};
use crate::client::{ClientResult, PatientCollection};
use crate::models::{Patient, PatientDraft, PatientInput};
use crate::validation::{message_for, to_input, FieldError, PatientField};

pub const REGISTERED_MESSAGE: &str = "Patient registered successfully.";

/// Draft state for registering a patient.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    draft: PatientDraft,
    errors: Vec<FieldError>,
    submitting: bool,
    notice: Option<Notice>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            draft: PatientDraft::blank(),
            errors: Vec::new(),
            submitting: false,
            notice: None,
        }
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: PatientField) -> Option<&str> {
        message_for(&self.errors, field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn set_patient_id(&mut self, value: impl Into<String>) {
        self.draft.patient_id = value.into();
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.draft.name = value.into();
    }

    pub fn set_age(&mut self, value: Option<i64>) {
        self.draft.age = value;
    }

    pub fn set_age_text(&mut self, raw: &str) {
        self.draft.age = parse_age(raw);
    }

    pub fn set_gender(&mut self, value: impl Into<String>) {
        self.draft.gender = value.into();
    }

    pub fn set_medical_condition(&mut self, value: impl Into<String>) {
        self.draft.medical_condition = value.into();
    }

    pub fn set_last_visit(&mut self, value: impl Into<String>) {
        self.draft.last_visit = value.into();
    }

    /// Validate the draft and mark the form busy.
    ///
    /// Returns the body to send. Validation errors are kept on the form.
    pub fn begin_submit(&mut self) -> FormResult<PatientInput> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        self.notice = None;

        match to_input(&self.draft) {
            Ok(input) => {
                self.errors.clear();
                self.submitting = true;
                Ok(input)
            }
            Err(errors) => {
                self.errors = errors.0.clone();
                Err(FormError::Invalid(errors))
            }
        }
    }

    /// Record the result of a create call.
    ///
    /// On success the draft is reset to blank.
    pub fn finish_submit(&mut self, result: ClientResult<Patient>) -> FormResult<Patient> {
        self.submitting = false;
        match result {
            Ok(patient) => {
                info!(patient_id = %patient.patient_id, "patient registered");
                self.draft = PatientDraft::blank();
                self.notice = Some(Notice::Success(REGISTERED_MESSAGE.to_string()));
                Ok(patient)
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                self.notice = Some(Notice::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    pub async fn submit<C: PatientCollection + ?Sized>(&mut self, collection: &C) -> FormResult<Patient> {
        let input = self.begin_submit()?;
        let result = collection.create(&input).await;
        self.finish_submit(result)
    }
}
