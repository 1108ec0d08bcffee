//! Text rendering for the terminal.

use std::fmt::Write as _;

use patient_registry_core::forms::Notice;
use patient_registry_core::list::{ListDisplay, ListViewModel};
use patient_registry_core::models::{Patient, SortField, DATE_FORMAT};
use patient_registry_core::validation::FieldError;

const ID_WIDTH: usize = 10;
const NAME_WIDTH: usize = 24;
const AGE_WIDTH: usize = 5;
const GENDER_WIDTH: usize = 7;
const CONDITION_WIDTH: usize = 24;

/// Render the whole list area: banner, table or state line, footer.
pub fn render_list(model: &ListViewModel) -> String {
    let mut out = String::new();

    if model.has_loaded() {
        if let Some(error) = model.error() {
            let _ = writeln!(out, "! {}", error);
        }
    }

    match model.display() {
        ListDisplay::Loading => out.push_str("Loading patients...\n"),
        ListDisplay::Failed(error) => {
            let _ = writeln!(out, "Error: {}", error);
        }
        ListDisplay::Empty => {
            out.push_str("No patients found\n");
            if model.is_filtered() {
                out.push_str("Try adjusting your search criteria\n");
            } else {
                out.push_str("Register a new patient to get started\n");
            }
        }
        ListDisplay::Rows(rows) => {
            out.push_str(&render_header(model));
            for patient in rows {
                out.push_str(&render_row(patient));
            }
            let _ = writeln!(out, "{}", model.summary());
            if model.total_pages() > 1 {
                let _ = writeln!(out, "{}", render_pages(model));
            }
        }
    }

    out
}

fn header_label(model: &ListViewModel, label: &str, field: SortField) -> String {
    match model.sort_indicator(field) {
        Some(arrow) => format!("{} {}", label, arrow),
        None => label.to_string(),
    }
}

fn render_header(model: &ListViewModel) -> String {
    let mut line = format!(
        "{:<id$} {:<name$} {:>age$} {:<gender$} {:<cond$} {}",
        header_label(model, "ID", SortField::PatientId),
        header_label(model, "Name", SortField::Name),
        header_label(model, "Age", SortField::Age),
        "Gender",
        "Condition",
        "Last Visit",
        id = ID_WIDTH,
        name = NAME_WIDTH,
        age = AGE_WIDTH,
        gender = GENDER_WIDTH,
        cond = CONDITION_WIDTH,
    );
    line.push('\n');
    line
}

/// One table row.
pub fn render_row(patient: &Patient) -> String {
    format!(
        "{:<id$} {:<name$} {:>age$} {:<gender$} {:<cond$} {}\n",
        clip(&patient.patient_id, ID_WIDTH),
        clip(&patient.name, NAME_WIDTH),
        patient.age,
        patient.gender.as_str(),
        clip(&patient.medical_condition, CONDITION_WIDTH),
        patient.last_visit.format(DATE_FORMAT),
        id = ID_WIDTH,
        name = NAME_WIDTH,
        age = AGE_WIDTH,
        gender = GENDER_WIDTH,
        cond = CONDITION_WIDTH,
    )
}

/// Page buttons, current page bracketed: `< [1] 2 3 >`.
pub fn render_pages(model: &ListViewModel) -> String {
    let current = model.query().page;
    let mut parts = Vec::new();
    if model.can_go_previous() {
        parts.push("<".to_string());
    }
    for n in model.page_numbers() {
        if n == current {
            parts.push(format!("[{}]", n));
        } else {
            parts.push(n.to_string());
        }
    }
    if model.can_go_next() {
        parts.push(">".to_string());
    }
    format!("Page {} of {}: {}", current, model.total_pages(), parts.join(" "))
}

/// Detail view of a single patient.
pub fn render_patient(patient: &Patient) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Patient ID:        {}", patient.patient_id);
    let _ = writeln!(out, "Name:              {}", patient.name);
    let _ = writeln!(out, "Age:               {}", patient.age);
    let _ = writeln!(out, "Gender:            {}", patient.gender);
    let _ = writeln!(out, "Medical condition: {}", patient.medical_condition);
    let _ = writeln!(out, "Last visit:        {}", patient.last_visit.format(DATE_FORMAT));
    out
}

/// Validation errors, one per line.
pub fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}: {}\n", e.field, e.message))
        .collect()
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(text) => text.clone(),
        Notice::Error(text) => format!("Error: {}", text),
    }
}

/// Truncate to `width` characters, marking the cut with `…`.
fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use patient_registry_core::client::ClientError;
    use patient_registry_core::list::FetchOutcome;
    use patient_registry_core::models::{Gender, ResultPage, PAGE_SIZE};
    use patient_registry_core::validation::PatientField;

    fn patient(n: u32) -> Patient {
        Patient {
            id: Some(i64::from(n)),
            patient_id: format!("P{:03}", n),
            name: format!("Patient {}", n),
            age: 40,
            gender: Gender::Female,
            medical_condition: "Asthma".into(),
            last_visit: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        }
    }

    fn loaded(total: u64, rows: u32) -> ListViewModel {
        let mut model = ListViewModel::new();
        let cmd = model.refresh();
        let items = (1..=rows).map(patient).collect();
        model.apply(FetchOutcome {
            seq: cmd.seq,
            result: Ok(ResultPage::new(items, total, 1, PAGE_SIZE)),
        });
        model
    }

    #[test]
    fn test_render_rows_and_footer() {
        let text = render_list(&loaded(45, 20));
        assert!(text.starts_with("ID ↑"));
        assert!(text.contains("P001"));
        assert!(text.contains("2024-05-06"));
        assert!(text.contains("Showing 20 of 45 patient(s)"));
        assert!(text.contains("Page 1 of 3: [1] 2 3 >"));
    }

    #[test]
    fn test_render_loading_and_empty() {
        let mut model = ListViewModel::new();
        model.refresh();
        assert_eq!(render_list(&model), "Loading patients...\n");

        let mut model = ListViewModel::new();
        let cmd = model.set_search("zzz");
        model.apply(FetchOutcome {
            seq: cmd.seq,
            result: Ok(ResultPage::new(Vec::new(), 0, 1, PAGE_SIZE)),
        });
        assert_eq!(
            render_list(&model),
            "No patients found\nTry adjusting your search criteria\n"
        );
    }

    #[test]
    fn test_render_error_banner_over_rows() {
        let mut model = loaded(3, 3);
        let cmd = model.refresh();
        model.apply(FetchOutcome {
            seq: cmd.seq,
            result: Err(ClientError::Network("connection refused".into())),
        });

        let text = render_list(&model);
        assert!(text.starts_with("! Network error: connection refused\n"));
        assert!(text.contains("P003"));
    }

    #[test]
    fn test_render_patient_detail() {
        let text = render_patient(&patient(7));
        assert!(text.contains("Patient ID:        P007"));
        assert!(text.contains("Gender:            Female"));
    }

    #[test]
    fn test_render_field_errors() {
        let errors = vec![FieldError {
            field: PatientField::Age,
            message: "Age is required.".into(),
        }];
        assert_eq!(render_field_errors(&errors), "  age: Age is required.\n");
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghijkl", 5), "abcd…");
    }
}
