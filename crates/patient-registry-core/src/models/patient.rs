//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format for `lastVisit`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Patient gender as accepted by the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// All accepted values, in display order.
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the accepted genders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender: {0}")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownGender(s.to_string()))
    }
}

/// A persisted patient record as returned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Server-assigned surrogate key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// User-assigned patient identifier (e.g. "P001")
    #[serde(rename = "patientID")]
    pub patient_id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender
    pub gender: Gender,
    /// Free-text medical condition
    pub medical_condition: String,
    /// Date of the last visit
    pub last_visit: NaiveDate,
}

impl Patient {
    /// Check if the server has assigned a surrogate key.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Copy this record into an editable draft.
    pub fn to_draft(&self) -> PatientDraft {
        PatientDraft {
            patient_id: self.patient_id.clone(),
            name: self.name.clone(),
            age: Some(i64::from(self.age)),
            gender: self.gender.as_str().to_string(),
            medical_condition: self.medical_condition.clone(),
            last_visit: self.last_visit.format(DATE_FORMAT).to_string(),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &PatientUpdate) {
        if let Some(patient_id) = &update.patient_id {
            self.patient_id = patient_id.clone();
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(condition) = &update.medical_condition {
            self.medical_condition = condition.clone();
        }
        if let Some(last_visit) = update.last_visit {
            self.last_visit = last_visit;
        }
    }
}

/// Validated body for creating a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    #[serde(rename = "patientID")]
    pub patient_id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub medical_condition: String,
    pub last_visit: NaiveDate,
}

impl PatientInput {
    /// Attach a surrogate key, producing the persisted form.
    pub fn into_patient(self, id: i64) -> Patient {
        Patient {
            id: Some(id),
            patient_id: self.patient_id,
            name: self.name,
            age: self.age,
            gender: self.gender,
            medical_condition: self.medical_condition,
            last_visit: self.last_visit,
        }
    }
}

impl From<&Patient> for PatientInput {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: patient.patient_id.clone(),
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender,
            medical_condition: patient.medical_condition.clone(),
            last_visit: patient.last_visit,
        }
    }
}

/// Partial update body. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(rename = "patientID", default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<NaiveDate>,
}

impl PatientUpdate {
    /// Fields of `edited` that differ from `original`.
    pub fn diff(original: &Patient, edited: &PatientInput) -> Self {
        fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
            (before != after).then(|| after.clone())
        }

        Self {
            patient_id: changed(&original.patient_id, &edited.patient_id),
            name: changed(&original.name, &edited.name),
            age: changed(&original.age, &edited.age),
            gender: changed(&original.gender, &edited.gender),
            medical_condition: changed(&original.medical_condition, &edited.medical_condition),
            last_visit: changed(&original.last_visit, &edited.last_visit),
        }
    }

    /// Changes made in a form opened on `original`.
    ///
    /// Text fields count as changed only when the typed text differs from
    /// the opening copy, so padding already stored on the record is not
    /// sent back trimmed. Values come from the validated `input`.
    pub fn from_edits(original: &Patient, edited: &PatientDraft, input: &PatientInput) -> Self {
        let opened = original.to_draft();
        let typed = |before: &str, after: &str, value: &str| {
            (before != after).then(|| value.to_string())
        };

        Self {
            patient_id: typed(&opened.patient_id, &edited.patient_id, &input.patient_id),
            name: typed(&opened.name, &edited.name, &input.name),
            medical_condition: typed(
                &opened.medical_condition,
                &edited.medical_condition,
                &input.medical_condition,
            ),
            ..Self::diff(original, input)
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none()
            && self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.medical_condition.is_none()
            && self.last_visit.is_none()
    }
}

/// Raw form input for a patient. May violate every invariant until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientDraft {
    pub patient_id: String,
    pub name: String,
    /// `None` when the age field is blank or not a number
    pub age: Option<i64>,
    pub gender: String,
    pub medical_condition: String,
    /// Expected as `YYYY-MM-DD`
    pub last_visit: String,
}

impl PatientDraft {
    /// Blank registration draft. Gender defaults to `Male` like the form's first option.
    pub fn blank() -> Self {
        Self {
            gender: Gender::Male.as_str().to_string(),
            ..Self::default()
        }
    }
}

impl From<&PatientInput> for PatientDraft {
    fn from(input: &PatientInput) -> Self {
        Self {
            patient_id: input.patient_id.clone(),
            name: input.name.clone(),
            age: Some(i64::from(input.age)),
            gender: input.gender.as_str().to_string(),
            medical_condition: input.medical_condition.clone(),
            last_visit: input.last_visit.format(DATE_FORMAT).to_string(),
        }
    }
}
