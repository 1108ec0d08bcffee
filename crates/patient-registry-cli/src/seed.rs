//! Sample records for local stores.

use chrono::{Duration, NaiveDate};
use patient_registry_core::models::{Gender, PatientInput};

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Maria", "Ahmed", "Wei", "Olga", "Kwame", "Sofia", "Liam", "Priya",
];

const LAST_NAMES: &[&str] = &[
    "Doe", "Smith", "Garcia", "Hassan", "Chen", "Ivanova", "Mensah", "Rossi", "Murphy", "Patel",
];

const CONDITIONS: &[&str] = &[
    "Hypertension",
    "Type 2 diabetes",
    "Asthma",
    "Migraine",
    "Osteoarthritis",
    "Seasonal allergies",
    "Hypothyroidism",
    "Routine checkup",
];

/// `count` deterministic patients with IDs `P001`, `P002`, ...
pub fn sample_patients(count: u32) -> Vec<PatientInput> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (1..=count).map(|n| sample_patient(n, base)).collect()
}

fn sample_patient(n: u32, base: NaiveDate) -> PatientInput {
    let i = n as usize;
    PatientInput {
        patient_id: format!("P{:03}", n),
        name: format!(
            "{} {}",
            FIRST_NAMES[i % FIRST_NAMES.len()],
            LAST_NAMES[(i * 7 + i / LAST_NAMES.len()) % LAST_NAMES.len()]
        ),
        age: 1 + (n * 37) % 95,
        gender: Gender::ALL[i % Gender::ALL.len()],
        medical_condition: CONDITIONS[(i * 3) % CONDITIONS.len()].to_string(),
        last_visit: base + Duration::days(i64::from((n * 11) % 360)),
    }
}
