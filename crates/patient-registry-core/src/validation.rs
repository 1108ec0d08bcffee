//! Client-side validation of patient drafts.
//!
//! Every field is checked independently so a single pass reports all
//! violations together. The same check runs before every create and update.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Gender, PatientDraft, PatientInput, DATE_FORMAT};

/// Field of a patient record, named as on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientField {
    #[serde(rename = "patientID")]
    PatientId,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "medicalCondition")]
    MedicalCondition,
    #[serde(rename = "lastVisit")]
    LastVisit,
}

impl PatientField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientField::PatientId => "patientID",
            PatientField::Name => "name",
            PatientField::Age => "age",
            PatientField::Gender => "gender",
            PatientField::MedicalCondition => "medicalCondition",
            PatientField::LastVisit => "lastVisit",
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-scoped violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: PatientField,
    pub message: String,
}

impl FieldError {
    fn new(field: PatientField, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty list of violations, returned when a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// First message reported for `field`, if any.
    pub fn message_for(&self, field: PatientField) -> Option<&str> {
        message_for(&self.0, field)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// First message reported for `field` in `errors`.
pub fn message_for(errors: &[FieldError], field: PatientField) -> Option<&str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}

/// Validate a draft, returning every violation in field order.
pub fn validate_patient(draft: &PatientDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if is_blank(&draft.patient_id) {
        errors.push(FieldError::new(PatientField::PatientId, "Patient ID is required."));
    }

    if is_blank(&draft.name) {
        errors.push(FieldError::new(PatientField::Name, "Name is required."));
    }

    match draft.age {
        None => errors.push(FieldError::new(PatientField::Age, "Age is required.")),
        Some(age) if age <= 0 => errors.push(FieldError::new(
            PatientField::Age,
            "Age must be greater than zero.",
        )),
        Some(age) if u32::try_from(age).is_err() => errors.push(FieldError::new(
            PatientField::Age,
            "Age is out of range.",
        )),
        Some(_) => {}
    }

    if is_blank(&draft.gender) {
        errors.push(FieldError::new(PatientField::Gender, "Gender is required."));
    } else if draft.gender.parse::<Gender>().is_err() {
        errors.push(FieldError::new(
            PatientField::Gender,
            "Gender must be one of Male, Female, Other.",
        ));
    }

    if is_blank(&draft.medical_condition) {
        errors.push(FieldError::new(
            PatientField::MedicalCondition,
            "Medical condition is required.",
        ));
    }

    if is_blank(&draft.last_visit) {
        errors.push(FieldError::new(
            PatientField::LastVisit,
            "Last visit date is required.",
        ));
    } else if !is_iso_date_shape(&draft.last_visit) {
        errors.push(FieldError::new(
            PatientField::LastVisit,
            "Last visit must be in YYYY-MM-DD format.",
        ));
    } else if parse_date(&draft.last_visit).is_none() {
        errors.push(FieldError::new(
            PatientField::LastVisit,
            "Last visit must be a valid calendar date.",
        ));
    }

    errors
}

/// Validate an already-typed record (string fields and age only).
pub fn validate_input(input: &PatientInput) -> Vec<FieldError> {
    validate_patient(&PatientDraft::from(input))
}

/// Validate and convert a draft into a typed create body.
pub fn to_input(draft: &PatientDraft) -> Result<PatientInput, ValidationErrors> {
    let errors = validate_patient(draft);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    // Every branch below was checked by validate_patient.
    let invalid = |field: PatientField| {
        ValidationErrors(vec![FieldError::new(field, "Invalid value.")])
    };
    let age = draft
        .age
        .and_then(|a| u32::try_from(a).ok())
        .ok_or_else(|| invalid(PatientField::Age))?;
    let gender = draft
        .gender
        .parse::<Gender>()
        .map_err(|_| invalid(PatientField::Gender))?;
    let last_visit = parse_date(&draft.last_visit).ok_or_else(|| invalid(PatientField::LastVisit))?;

    Ok(PatientInput {
        patient_id: draft.patient_id.trim().to_string(),
        name: draft.name.trim().to_string(),
        age,
        gender,
        medical_condition: draft.medical_condition.trim().to_string(),
        last_visit,
    })
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Exactly `dddd-dd-dd`, nothing else.
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
