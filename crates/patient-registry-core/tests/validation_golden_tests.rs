//! Golden tests for patient draft validation.
//!
//! Each case starts from a valid draft, applies one set of edits and lists
//! the fields expected to be reported, in order.

use patient_registry_core::models::PatientDraft;
use patient_registry_core::validation::{to_input, validate_patient, PatientField};

/// Test case from golden table.
struct GoldenCase {
    id: &'static str,
    patient_id: &'static str,
    name: &'static str,
    age: Option<i64>,
    gender: &'static str,
    medical_condition: &'static str,
    last_visit: &'static str,
    expected_fields: &'static [PatientField],
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "valid-record",
            patient_id: "P001",
            name: "John Doe",
            age: Some(45),
            gender: "Male",
            medical_condition: "Hypertension",
            last_visit: "2024-11-15",
            expected_fields: &[],
        },
        GoldenCase {
            id: "three-violations",
            patient_id: "",
            name: "John",
            age: Some(0),
            gender: "Male",
            medical_condition: "x",
            last_visit: "2024/13/40",
            expected_fields: &[PatientField::PatientId, PatientField::Age, PatientField::LastVisit],
        },
        GoldenCase {
            id: "whitespace-only-strings",
            patient_id: "   ",
            name: "\t",
            age: Some(30),
            gender: "Female",
            medical_condition: "  ",
            last_visit: "2024-01-01",
            expected_fields: &[
                PatientField::PatientId,
                PatientField::Name,
                PatientField::MedicalCondition,
            ],
        },
        GoldenCase {
            id: "missing-age",
            patient_id: "P002",
            name: "Jane",
            age: None,
            gender: "Female",
            medical_condition: "Asthma",
            last_visit: "2024-01-01",
            expected_fields: &[PatientField::Age],
        },
        GoldenCase {
            id: "negative-age",
            patient_id: "P002",
            name: "Jane",
            age: Some(-4),
            gender: "Female",
            medical_condition: "Asthma",
            last_visit: "2024-01-01",
            expected_fields: &[PatientField::Age],
        },
        GoldenCase {
            id: "unknown-gender",
            patient_id: "P003",
            name: "Sam",
            age: Some(22),
            gender: "Unknown",
            medical_condition: "Migraine",
            last_visit: "2024-06-30",
            expected_fields: &[PatientField::Gender],
        },
        GoldenCase {
            id: "lowercase-gender-accepted",
            patient_id: "P003",
            name: "Sam",
            age: Some(22),
            gender: "other",
            medical_condition: "Migraine",
            last_visit: "2024-06-30",
            expected_fields: &[],
        },
        GoldenCase {
            id: "short-date",
            patient_id: "P004",
            name: "Ana",
            age: Some(61),
            gender: "Female",
            medical_condition: "Diabetes",
            last_visit: "2024-1-5",
            expected_fields: &[PatientField::LastVisit],
        },
        GoldenCase {
            id: "impossible-date",
            patient_id: "P004",
            name: "Ana",
            age: Some(61),
            gender: "Female",
            medical_condition: "Diabetes",
            last_visit: "2023-02-29",
            expected_fields: &[PatientField::LastVisit],
        },
        GoldenCase {
            id: "leap-day",
            patient_id: "P004",
            name: "Ana",
            age: Some(61),
            gender: "Female",
            medical_condition: "Diabetes",
            last_visit: "2024-02-29",
            expected_fields: &[],
        },
        GoldenCase {
            id: "everything-blank",
            patient_id: "",
            name: "",
            age: None,
            gender: "",
            medical_condition: "",
            last_visit: "",
            expected_fields: &[
                PatientField::PatientId,
                PatientField::Name,
                PatientField::Age,
                PatientField::Gender,
                PatientField::MedicalCondition,
                PatientField::LastVisit,
            ],
        },
    ]
}

fn draft(case: &GoldenCase) -> PatientDraft {
    PatientDraft {
        patient_id: case.patient_id.to_string(),
        name: case.name.to_string(),
        age: case.age,
        gender: case.gender.to_string(),
        medical_condition: case.medical_condition.to_string(),
        last_visit: case.last_visit.to_string(),
    }
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let errors = validate_patient(&draft(&case));
        let fields: Vec<PatientField> = errors.iter().map(|e| e.field).collect();

        assert_eq!(
            fields, case.expected_fields,
            "Case {}: reported fields mismatch", case.id
        );

        assert_eq!(
            to_input(&draft(&case)).is_ok(),
            case.expected_fields.is_empty(),
            "Case {}: conversion disagrees with validation", case.id
        );
    }
}

#[test]
fn test_all_messages() {
    let message_tests = vec![
        ("three-violations", vec![
            "Patient ID is required.",
            "Age must be greater than zero.",
            "Last visit must be in YYYY-MM-DD format.",
        ]),
        ("missing-age", vec!["Age is required."]),
        ("unknown-gender", vec!["Gender must be one of Male, Female, Other."]),
        ("impossible-date", vec!["Last visit must be a valid calendar date."]),
    ];

    let cases = get_golden_cases();
    for (id, expected) in message_tests {
        let case = cases.iter().find(|c| c.id == id).unwrap();
        let messages: Vec<String> = validate_patient(&draft(case))
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, expected, "Case {}: messages mismatch", id);
    }
}
