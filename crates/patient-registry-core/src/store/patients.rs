//! Patient table operations.

use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::{conflict_message, not_found_message, LocalStore, StoreError, StoreResult};
use crate::models::{Patient, PatientInput, PatientUpdate, QueryState, SortField, SortOrder, DATE_FORMAT};
use crate::validation::validate_input;

const SELECT_COLUMNS: &str =
    "id, patient_id, name, age, gender, medical_condition, last_visit";

impl LocalStore {
    /// Insert a new patient, returning it with its surrogate key.
    pub fn insert_patient(&self, input: &PatientInput) -> StoreResult<Patient> {
        check(input)?;
        let conn = self.conn()?;

        let result = conn.execute(
            r#"
            INSERT INTO patients (
                patient_id, name, age, gender, medical_condition, last_visit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                input.patient_id,
                input.name,
                input.age,
                input.gender.as_str(),
                input.medical_condition,
                input.last_visit.format(DATE_FORMAT).to_string(),
            ],
        );
        map_constraint(result, &input.patient_id)?;

        Ok(input.clone().into_patient(conn.last_insert_rowid()))
    }

    /// Get a patient by patient ID.
    pub fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>> {
        let conn = self.conn()?;
        fetch_by_patient_id(&conn, patient_id)
    }

    /// Apply a partial update to the patient stored under `patient_id`.
    pub fn update_patient(&self, patient_id: &str, changes: &PatientUpdate) -> StoreResult<Patient> {
        let conn = self.conn()?;
        let mut patient = fetch_by_patient_id(&conn, patient_id)?
            .ok_or_else(|| StoreError::NotFound(not_found_message(patient_id)))?;
        let id = patient
            .id
            .ok_or_else(|| StoreError::Corrupt(format!("patient {} has no id", patient_id)))?;

        patient.apply(changes);
        check(&PatientInput::from(&patient))?;

        let result = conn.execute(
            r#"
            UPDATE patients SET
                patient_id = ?2,
                name = ?3,
                age = ?4,
                gender = ?5,
                medical_condition = ?6,
                last_visit = ?7,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                id,
                patient.patient_id,
                patient.name,
                patient.age,
                patient.gender.as_str(),
                patient.medical_condition,
                patient.last_visit.format(DATE_FORMAT).to_string(),
            ],
        );
        map_constraint(result, &patient.patient_id)?;

        Ok(patient)
    }

    /// Delete a patient. Returns false when no row matched.
    pub fn delete_patient(&self, patient_id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .conn()?
            .execute("DELETE FROM patients WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }

    /// Count all patients.
    pub fn count_patients(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// One page of patients matching `query`, plus the total match count.
    ///
    /// Search is a case-insensitive substring match on patient ID or name.
    pub fn search_patients(&self, query: &QueryState) -> StoreResult<(Vec<Patient>, u64)> {
        let conn = self.conn()?;
        let pattern = query
            .search_term()
            .map(|term| format!("%{}%", escape_like(term)));

        let filter = "?1 IS NULL OR patient_id LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\'";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM patients WHERE {}", filter),
            params![pattern],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM patients WHERE {} ORDER BY {} {}, id ASC LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS,
            filter,
            sort_column(query.sort_field),
            sort_direction(query.sort_order),
        );
        let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern, query.page_size, offset], PatientRow::read)?;

        let mut patients: Vec<Patient> = Vec::new();
        for row in rows {
            patients.push(Patient::try_from(row?)?);
        }

        Ok((patients, u64::try_from(total).unwrap_or(0)))
    }
}

fn fetch_by_patient_id(conn: &Connection, patient_id: &str) -> StoreResult<Option<Patient>> {
    conn.query_row(
        &format!("SELECT {} FROM patients WHERE patient_id = ?", SELECT_COLUMNS),
        [patient_id],
        PatientRow::read,
    )
    .optional()?
    .map(Patient::try_from)
    .transpose()
}

/// Re-validate a record the way the server does before persisting it.
fn check(input: &PatientInput) -> StoreResult<()> {
    let errors = validate_input(input);
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(StoreError::Invalid(message))
}

fn map_constraint(result: rusqlite::Result<usize>, patient_id: &str) -> StoreResult<usize> {
    match result {
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(StoreError::Conflict(conflict_message(patient_id)))
        }
        other => Ok(other?),
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::PatientId => "patient_id",
        SortField::Name => "name",
        SortField::Age => "age",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    patient_id: String,
    name: String,
    age: i64,
    gender: String,
    medical_condition: String,
    last_visit: String,
}

impl PatientRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            name: row.get(2)?,
            age: row.get(3)?,
            gender: row.get(4)?,
            medical_condition: row.get(5)?,
            last_visit: row.get(6)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = StoreError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let age = u32::try_from(row.age)
            .map_err(|_| StoreError::Corrupt(format!("age {} for {}", row.age, row.patient_id)))?;
        let gender = row
            .gender
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("gender {} for {}", row.gender, row.patient_id)))?;
        let last_visit = NaiveDate::parse_from_str(&row.last_visit, DATE_FORMAT).map_err(|_| {
            StoreError::Corrupt(format!("last_visit {} for {}", row.last_visit, row.patient_id))
        })?;

        Ok(Patient {
            id: Some(row.id),
            patient_id: row.patient_id,
            name: row.name,
            age,
            gender,
            medical_condition: row.medical_condition,
            last_visit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn setup_store() -> LocalStore {
        LocalStore::open_in_memory().unwrap()
    }

    fn input(patient_id: &str, name: &str, age: u32) -> PatientInput {
        PatientInput {
            patient_id: patient_id.into(),
            name: name.into(),
            age,
            gender: Gender::Female,
            medical_condition: "Asthma".into(),
            last_visit: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = setup_store();

        let created = store.insert_patient(&input("P001", "Jane Smith", 30)).unwrap();
        assert!(created.is_persisted());

        let retrieved = store.get_patient("P001").unwrap().unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.gender, Gender::Female);
        assert_eq!(retrieved.last_visit.to_string(), "2024-12-01");
    }

    #[test]
    fn test_duplicate_patient_id_conflicts() {
        let store = setup_store();
        store.insert_patient(&input("P001", "Jane", 30)).unwrap();

        let err = store.insert_patient(&input("P001", "Other", 40)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref msg) if msg == "Patient with ID 'P001' already exists"));
    }

    #[test]
    fn test_insert_rejects_invalid_record() {
        let store = setup_store();
        let err = store.insert_patient(&input("P001", "   ", 0)).unwrap_err();
        match err {
            StoreError::Invalid(msg) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("age"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.count_patients().unwrap(), 0);
    }

    #[test]
    fn test_search_case_insensitive_on_id_and_name() {
        let store = setup_store();
        store.insert_patient(&input("P001", "John Doe", 45)).unwrap();
        store.insert_patient(&input("P002", "Jane Smith", 30)).unwrap();
        store.insert_patient(&input("X100", "Johnny Cash", 70)).unwrap();

        let query = QueryState {
            search: "JOHN".into(),
            ..Default::default()
        };
        let (items, total) = store.search_patients(&query).unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 2);

        let query = QueryState {
            search: "p00".into(),
            ..Default::default()
        };
        let (_, total) = store.search_patients(&query).unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let store = setup_store();
        store.insert_patient(&input("P001", "John Doe", 45)).unwrap();
        store.insert_patient(&input("P_02", "Jane Smith", 30)).unwrap();

        let query = QueryState {
            search: "_".into(),
            ..Default::default()
        };
        let (items, total) = store.search_patients(&query).unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].patient_id, "P_02");
    }

    #[test]
    fn test_sort_and_paging() {
        let store = setup_store();
        for (i, age) in [50, 20, 35, 20, 90].iter().enumerate() {
            store
                .insert_patient(&input(&format!("P{:03}", i + 1), &format!("Name {}", i), *age))
                .unwrap();
        }

        let query = QueryState {
            sort_field: SortField::Age,
            sort_order: SortOrder::Desc,
            page_size: 2,
            ..Default::default()
        };
        let (items, total) = store.search_patients(&query).unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.iter().map(|p| p.age).collect::<Vec<_>>(), vec![90, 50]);

        let query = QueryState {
            page: 3,
            ..query
        };
        let (items, _) = store.search_patients(&query).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].age, 20);
    }

    #[test]
    fn test_update_partial_and_rename() {
        let store = setup_store();
        store.insert_patient(&input("P001", "Jane", 30)).unwrap();

        let updated = store
            .update_patient(
                "P001",
                &PatientUpdate {
                    patient_id: Some("P100".into()),
                    age: Some(31),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.patient_id, "P100");
        assert_eq!(updated.age, 31);
        assert_eq!(updated.name, "Jane");

        assert!(store.get_patient("P001").unwrap().is_none());
        assert_eq!(store.get_patient("P100").unwrap().unwrap().age, 31);
    }

    #[test]
    fn test_update_conflict_and_missing() {
        let store = setup_store();
        store.insert_patient(&input("P001", "Jane", 30)).unwrap();
        store.insert_patient(&input("P002", "John", 40)).unwrap();

        let err = store
            .update_patient(
                "P002",
                &PatientUpdate {
                    patient_id: Some("P001".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store.update_patient("P404", &PatientUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_delete_patient() {
        let store = setup_store();
        store.insert_patient(&input("P001", "Jane", 30)).unwrap();

        assert!(store.delete_patient("P001").unwrap());
        assert!(!store.delete_patient("P001").unwrap());
        assert_eq!(store.count_patients().unwrap(), 0);
    }
}
