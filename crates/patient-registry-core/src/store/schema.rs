//! SQLite schema definition.

/// Complete database schema for the local patient store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,        -- surrogate key returned as `id`
    patient_id TEXT NOT NULL UNIQUE,             -- user-assigned, e.g. P001
    name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0),
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    medical_condition TEXT NOT NULL,
    last_visit TEXT NOT NULL,                    -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_age ON patients(age);
"#;
