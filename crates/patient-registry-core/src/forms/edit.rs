//! Edit form for an existing patient.

use tracing::{debug, info, warn};

use super::{parse_age, FormError, FormResult, Notice};
use crate::client::{ClientResult, PatientCollection};
use crate::models::{Patient, PatientDraft, PatientUpdate};
use crate::validation::{message_for, to_input, FieldError, PatientField};

pub const UPDATED_MESSAGE: &str = "Patient updated successfully.";
pub const NO_CHANGES_MESSAGE: &str = "No changes to save.";

/// Editable copy of a persisted patient.
///
/// The draft is copied from the record when the form opens; edits never
/// touch the original until the server confirms an update.
#[derive(Debug, Clone)]
pub struct EditForm {
    original: Patient,
    draft: PatientDraft,
    errors: Vec<FieldError>,
    submitting: bool,
    notice: Option<Notice>,
}

impl EditForm {
    pub fn new(original: Patient) -> Self {
        let draft = original.to_draft();
        Self {
            original,
            draft,
            errors: Vec::new(),
            submitting: false,
            notice: None,
        }
    }

    /// Record as last confirmed by the server.
    pub fn original(&self) -> &Patient {
        &self.original
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

    /// Discard edits and start over from the original.
    pub fn reset(&mut self) {
        self.draft = self.original.to_draft();
        self.errors.clear();
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

    /// Validate the draft and compute the changed fields.
    ///
    /// `Ok(None)` means nothing changed; the form then reports
    /// [`NO_CHANGES_MESSAGE`] and no request should be sent.
    pub fn begin_submit(&mut self) -> FormResult<Option<PatientUpdate>> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        self.notice = None;

        let input = match to_input(&self.draft) {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors.0.clone();
                return Err(FormError::Invalid(errors));
            }
        };
        self.errors.clear();

        let changes = PatientUpdate::from_edits(&self.original, &self.draft, &input);
        if changes.is_empty() {
            debug!(patient_id = %self.original.patient_id, "edit has no changes");
            self.notice = Some(Notice::Success(NO_CHANGES_MESSAGE.to_string()));
            return Ok(None);
        }

        self.submitting = true;
        Ok(Some(changes))
    }

    /// Record the result of an update call.
    pub fn finish_submit(&mut self, result: ClientResult<Patient>) -> FormResult<Patient> {
        self.submitting = false;
        match result {
            Ok(patient) => {
                info!(patient_id = %patient.patient_id, "patient updated");
                self.original = patient.clone();
                self.draft = patient.to_draft();
                self.notice = Some(Notice::Success(UPDATED_MESSAGE.to_string()));
                Ok(patient)
            }
            Err(e) => {
                warn!(patient_id = %self.original.patient_id, error = %e, "update failed");
                self.notice = Some(Notice::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Send the changed fields, addressed by the original patient ID.
    ///
    /// Returns `Ok(None)` without a request when nothing changed.
    pub async fn submit<C: PatientCollection + ?Sized>(
        &mut self,
        collection: &C,
    ) -> FormResult<Option<Patient>> {
        let Some(changes) = self.begin_submit()? else {
            return Ok(None);
        };
        let result = collection
            .update(&self.original.patient_id, &changes)
            .await;
        self.finish_submit(result).map(Some)
    }
}
