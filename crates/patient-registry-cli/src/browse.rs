//! Interactive list browsing.

use std::io::{BufRead, Write};

use patient_registry_core::client::PatientCollection;
use patient_registry_core::list::ListController;
use patient_registry_core::models::SortField;
use thiserror::Error;

use crate::render::{render_list, render_patient};

/// Browse command parse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Invalid sort column: {0} (id, name, age)")]
    InvalidSort(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Empty text clears the search
    Search(String),
    Sort(SortField),
    Page(u32),
    Next,
    Previous,
    Refresh,
    Show(String),
    Delete(String),
    Help,
    Quit,
    /// Blank line; re-render
    Nothing,
}

pub const HELP: &str = "\
Commands:
  search [text]    filter by patient ID or name (no text clears)
  sort <column>    id, name or age; repeat to flip the order
  page <n>         go to page n
  next | prev      move one page
  refresh          reload the current page
  show <id>        show one patient
  delete <id>      delete a patient
  help             this text
  quit             leave
";

/// Parse a prompt line.
pub fn parse_command(line: &str) -> CommandResult<BrowseCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => BrowseCommand::Nothing,
        "search" | "s" | "/" => BrowseCommand::Search(rest.to_string()),
        "sort" => {
            let column = required(rest, "sort")?;
            let field = column
                .parse::<SortField>()
                .map_err(|_| CommandError::InvalidSort(column.to_string()))?;
            BrowseCommand::Sort(field)
        }
        "page" | "p" => {
            let raw = required(rest, "page")?;
            let page = raw
                .parse::<u32>()
                .map_err(|_| CommandError::InvalidPage(raw.to_string()))?;
            BrowseCommand::Page(page)
        }
        "next" | "n" => BrowseCommand::Next,
        "prev" | "previous" => BrowseCommand::Previous,
        "refresh" | "r" => BrowseCommand::Refresh,
        "show" => BrowseCommand::Show(required(rest, "show")?.to_string()),
        "delete" | "rm" => BrowseCommand::Delete(required(rest, "delete")?.to_string()),
        "help" | "h" | "?" => BrowseCommand::Help,
        "quit" | "q" | "exit" => BrowseCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required<'a>(rest: &'a str, command: &'static str) -> CommandResult<&'a str> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

/// Run the prompt loop until `quit` or end of input.
///
/// Deletions ask for confirmation on the next input line.
pub async fn run_browse<C, R, W>(
    controller: &mut ListController<C>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    C: PatientCollection,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    controller.refresh().await;
    write!(out, "{}", render_list(controller.model()))?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let command = match parse_command(&line?) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                write!(out, "{}", HELP)?;
                continue;
            }
            BrowseCommand::Nothing => {}
            BrowseCommand::Search(text) => controller.set_search(text).await,
            BrowseCommand::Sort(field) => controller.set_sort(field).await,
            BrowseCommand::Page(n) => controller.set_page(n).await,
            BrowseCommand::Next => controller.next_page().await,
            BrowseCommand::Previous => controller.previous_page().await,
            BrowseCommand::Refresh => controller.refresh().await,
            BrowseCommand::Show(patient_id) => {
                match controller.collection().get(&patient_id).await {
                    Ok(patient) => write!(out, "{}", render_patient(&patient))?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
                continue;
            }
            BrowseCommand::Delete(patient_id) => {
                write!(out, "Are you sure you want to delete patient {}? [y/N] ", patient_id)?;
                out.flush()?;
                let answer = lines.next().transpose()?.unwrap_or_default();
                if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                    writeln!(out, "Cancelled.")?;
                    continue;
                }
                match controller.delete(&patient_id).await {
                    Ok(()) => writeln!(out, "Deleted patient {}.", patient_id)?,
                    Err(e) => {
                        writeln!(out, "Error: {}", e)?;
                        continue;
                    }
                }
            }
        }

        write!(out, "{}", render_list(controller.model()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_patients;
    use patient_registry_core::store::LocalStore;
    use proptest::prelude::*;

    fn seeded(count: u32) -> ListController<LocalStore> {
        let store = LocalStore::open_in_memory().unwrap();
        for patient in sample_patients(count) {
            store.insert_patient(&patient).unwrap();
        }
        ListController::new(store)
    }

    async fn run_script(controller: &mut ListController<LocalStore>, script: &str) -> String {
        let mut out = Vec::new();
        run_browse(controller, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("search  John Doe "), Ok(BrowseCommand::Search("John Doe".into())));
        assert_eq!(parse_command("search"), Ok(BrowseCommand::Search(String::new())));
        assert_eq!(parse_command("SORT age"), Ok(BrowseCommand::Sort(SortField::Age)));
        assert_eq!(parse_command("sort id"), Ok(BrowseCommand::Sort(SortField::PatientId)));
        assert_eq!(parse_command("page 3"), Ok(BrowseCommand::Page(3)));
        assert_eq!(parse_command("n"), Ok(BrowseCommand::Next));
        assert_eq!(parse_command("delete P001"), Ok(BrowseCommand::Delete("P001".into())));
        assert_eq!(parse_command("   "), Ok(BrowseCommand::Nothing));
        assert_eq!(parse_command("q"), Ok(BrowseCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("page x"), Err(CommandError::InvalidPage("x".into())));
        assert_eq!(parse_command("page"), Err(CommandError::MissingArgument("page")));
        assert_eq!(parse_command("sort weight"), Err(CommandError::InvalidSort("weight".into())));
        assert_eq!(parse_command("fly"), Err(CommandError::Unknown("fly".into())));
    }

    #[tokio::test]
    async fn test_browse_search_and_page() {
        let mut controller = seeded(45);
        let out = run_script(&mut controller, "next\nsearch P04\nquit\n").await;

        assert!(out.contains("Showing 20 of 45 patient(s)"));
        assert!(out.contains("Page 2 of 3"));
        assert!(out.contains("Showing 6 of 6 patient(s) (filtered)"));
        assert_eq!(controller.model().query().page, 1);
    }

    #[tokio::test]
    async fn test_browse_delete_confirmed_and_cancelled() {
        let mut controller = seeded(3);
        let out = run_script(&mut controller, "delete P001\nno\ndelete P002\ny\n").await;

        assert!(out.contains("Cancelled."));
        assert!(out.contains("Deleted patient P002."));
        assert_eq!(controller.model().total(), 2);
        assert!(controller.collection().get_patient("P001").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_browse_reports_errors_and_continues() {
        let mut controller = seeded(2);
        let out = run_script(&mut controller, "jump\ndelete P404\nyes\nshow P002\n").await;

        assert!(out.contains("Unknown command: jump"));
        assert!(out.contains("Error: Patient with ID 'P404' not found"));
        assert!(out.contains("Patient ID:        P002"));
    }

    proptest! {
        #[test]
        fn test_parse_never_panics(line in "\\PC{0,40}") {
            let _ = parse_command(&line);
        }
    }
}
