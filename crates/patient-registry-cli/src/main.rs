use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use patient_registry_core::forms::{EditForm, FormError, RegistrationForm};
use patient_registry_core::list::{ListController, ListViewModel};
use patient_registry_core::{open_collection, FieldError, Notice, PatientCollection, Source};
use patient_registry_cli::{
    render_field_errors, render_list, render_notice, render_patient, run_browse, sample_patients,
    Args, Command, EditArgs, ListArgs, RegisterArgs,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Collection = Arc<dyn PatientCollection>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let source = args.source().context("invalid configuration")?;
    let collection = open_collection(&source).context("failed to open patient collection")?;

    match args.command {
        Command::List(list) => list_patients(collection, &list).await,
        Command::Show { patient_id, json } => show_patient(collection, &patient_id, json).await,
        Command::Register(register) => register_patient(collection, register).await,
        Command::Edit(edit) => edit_patient(collection, edit).await,
        Command::Delete { patient_id, yes } => delete_patient(collection, &patient_id, yes).await,
        Command::Seed { count } => seed(collection, &source, count).await,
        Command::Browse(list) => browse(collection, &list).await,
    }
}

async fn list_patients(collection: Collection, list: &ListArgs) -> Result<()> {
    let mut controller =
        ListController::with_model(collection, ListViewModel::with_query(list.to_query()));
    controller.refresh().await;

    let model = controller.model();
    if let Some(error) = model.error() {
        bail!("failed to load patients: {}", error);
    }
    if list.json {
        println!("{}", serde_json::to_string_pretty(&model.result())?);
    } else {
        print!("{}", render_list(model));
    }
    Ok(())
}

async fn show_patient(collection: Collection, patient_id: &str, json: bool) -> Result<()> {
    let patient = collection
        .get(patient_id)
        .await
        .with_context(|| format!("failed to load patient {}", patient_id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&patient)?);
    } else {
        print!("{}", render_patient(&patient));
    }
    Ok(())
}

async fn register_patient(collection: Collection, register: RegisterArgs) -> Result<()> {
    let mut form = RegistrationForm::new();
    form.set_patient_id(register.patient_id);
    form.set_name(register.name);
    form.set_age_text(&register.age);
    form.set_gender(register.gender);
    form.set_medical_condition(register.condition);
    form.set_last_visit(register.last_visit);

    let result = form.submit(&*collection).await;
    report_form(result.map(Some), form.errors(), form.notice())
}

async fn edit_patient(collection: Collection, edit: EditArgs) -> Result<()> {
    let original = collection
        .get(&edit.patient_id)
        .await
        .with_context(|| format!("failed to load patient {}", edit.patient_id))?;

    let mut form = EditForm::new(original);
    if let Some(value) = edit.new_patient_id {
        form.set_patient_id(value);
    }
    if let Some(value) = edit.name {
        form.set_name(value);
    }
    if let Some(value) = edit.age {
        form.set_age_text(&value);
    }
    if let Some(value) = edit.gender {
        form.set_gender(value);
    }
    if let Some(value) = edit.condition {
        form.set_medical_condition(value);
    }
    if let Some(value) = edit.last_visit {
        form.set_last_visit(value);
    }

    let result = form.submit(&*collection).await;
    report_form(result, form.errors(), form.notice())
}

/// Print a form outcome; validation and request failures become errors.
fn report_form<T>(
    result: Result<Option<T>, FormError>,
    errors: &[FieldError],
    notice: Option<&Notice>,
) -> Result<()> {
    if let Some(notice) = notice {
        if !notice.is_error() {
            println!("{}", render_notice(notice));
        }
    }
    match result {
        Ok(_) => Ok(()),
        Err(FormError::Invalid(_)) => {
            eprint!("{}", render_field_errors(errors));
            bail!("patient record is invalid")
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_patient(collection: Collection, patient_id: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Are you sure you want to delete patient {}?", patient_id))? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut controller = ListController::new(collection);
    controller
        .delete(patient_id)
        .await
        .with_context(|| format!("failed to delete patient {}", patient_id))?;
    println!("Deleted patient {}. {}", patient_id, controller.model().summary());
    Ok(())
}

async fn seed(collection: Collection, source: &Source, count: u32) -> Result<()> {
    if matches!(source, Source::Remote(_)) {
        bail!("seed only writes to a local store; pass --local <PATH>");
    }

    let mut created = 0;
    for patient in sample_patients(count) {
        collection
            .create(&patient)
            .await
            .with_context(|| format!("failed to create patient {}", patient.patient_id))?;
        created += 1;
    }
    info!(created, "seeded local store");
    println!("Created {} patient(s).", created);
    Ok(())
}

async fn browse(collection: Collection, list: &ListArgs) -> Result<()> {
    let mut controller =
        ListController::with_model(collection, ListViewModel::with_query(list.to_query()));
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_browse(&mut controller, stdin.lock(), &mut stdout).await
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
