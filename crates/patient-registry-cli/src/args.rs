//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use patient_registry_core::config::{parse_timeout, ClientConfig, ConfigError, Overrides};
use patient_registry_core::models::{QueryState, SortField, SortOrder};
use patient_registry_core::Source;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum SortArg {
    #[value(name = "id", alias = "patientid")]
    PatientId,
    Name,
    Age,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::PatientId => SortField::PatientId,
            SortArg::Name => SortField::Name,
            SortArg::Age => SortField::Age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "patients")]
#[command(about = "Patient registry - register, search, edit and delete patient records")]
#[command(version)]
pub struct Args {
    /// API base URL [env: PATIENT_API_BASE_URL] [default: http://localhost:8000]
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds [env: PATIENT_API_TIMEOUT_SECS] [default: 15]
    #[arg(long, global = true, value_parser = parse_timeout_arg)]
    pub timeout: Option<u64>,

    /// Use a local SQLite file instead of the API
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "base_url")]
    pub local: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List one page of patients
    List(ListArgs),

    /// Show a single patient
    Show {
        patient_id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Register a new patient
    Register(RegisterArgs),

    /// Change fields of an existing patient
    Edit(EditArgs),

    /// Delete a patient
    Delete {
        patient_id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Fill a local store with sample patients
    Seed {
        #[arg(short, long, default_value_t = 45)]
        count: u32,
    },

    /// Interactive list: search, sort, page and delete
    Browse(ListArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ListArgs {
    /// Match patient ID or name (case-insensitive substring)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort column: id, name, age [default: id]
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort order: asc, desc [default: asc]
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn to_query(&self) -> QueryState {
        let defaults = QueryState::default();
        QueryState {
            search: self.search.clone().unwrap_or_default(),
            page: self.page.max(1),
            sort_field: self.sort.map_or(defaults.sort_field, SortField::from),
            sort_order: self.order.map_or(defaults.sort_order, SortOrder::from),
            ..defaults
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long = "id")]
    pub patient_id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub age: String,

    /// Male, Female or Other
    #[arg(long, default_value = "Male")]
    pub gender: String,

    #[arg(long)]
    pub condition: String,

    /// YYYY-MM-DD
    #[arg(long)]
    pub last_visit: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EditArgs {
    /// Patient ID of the record to edit
    pub patient_id: String,

    /// New patient ID
    #[arg(long = "new-id")]
    pub new_patient_id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub age: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub condition: Option<String>,

    #[arg(long)]
    pub last_visit: Option<String>,
}

fn parse_timeout_arg(raw: &str) -> Result<u64, String> {
    parse_timeout(raw)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

impl Args {
    /// Resolve the collection source: `--local` wins, otherwise the API
    /// configured from the environment with flag overrides.
    pub fn source(&self) -> Result<Source, ConfigError> {
        self.source_with(|key| std::env::var(key).ok())
    }

    /// Like [`Args::source`], reading variables through `lookup`.
    pub fn source_with<F>(&self, lookup: F) -> Result<Source, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.local {
            return Ok(Source::Local(path.clone()));
        }

        let overrides = Overrides {
            base_url: self.base_url.clone(),
            timeout: self.timeout.map(std::time::Duration::from_secs),
        };
        let config = ClientConfig::from_lookup_with(lookup, &overrides)?;
        Ok(Source::Remote(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_registry_core::config::{BASE_URL_ENV, TIMEOUT_ENV};
    use std::time::Duration;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn env(url: &'static str, timeout: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| match key {
            BASE_URL_ENV => Some(url.to_string()),
            TIMEOUT_ENV => Some(timeout.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_list_args_to_query() {
        let args = parse(&["patients", "list", "--search", " jo ", "--sort", "age", "--order", "desc", "-p", "3"]);
        let Command::List(list) = args.command else {
            panic!("expected list");
        };
        let query = list.to_query();
        assert_eq!(query.search, " jo ");
        assert_eq!(query.page, 3);
        assert_eq!(query.sort_field, SortField::Age);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn test_list_defaults() {
        let args = parse(&["patients", "list"]);
        let Command::List(list) = args.command else {
            panic!("expected list");
        };
        assert_eq!(list.to_query(), QueryState::default());
    }

    #[test]
    fn test_sort_id_alias() {
        let args = parse(&["patients", "browse", "--sort", "patientid"]);
        let Command::Browse(list) = args.command else {
            panic!("expected browse");
        };
        assert_eq!(list.sort, Some(SortArg::PatientId));
    }

    #[test]
    fn test_local_source_wins() {
        let args = parse(&["patients", "--local", "registry.db", "list"]);
        let source = args
            .source_with(|_| Some("not a url".into()))
            .unwrap();
        assert_eq!(source, Source::Local(PathBuf::from("registry.db")));
    }

    #[test]
    fn test_flags_override_environment() {
        let args = parse(&["patients", "list", "--base-url", "http://api.test/", "--timeout", "3"]);
        let source = args.source_with(env("http://env.test", "30")).unwrap();
        assert_eq!(
            source,
            Source::Remote(ClientConfig::new("http://api.test").with_timeout(Duration::from_secs(3)))
        );
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let args = parse(&["patients", "list", "--base-url", "not a url"]);
        assert!(args.source_with(|_| None).is_err());
    }

    #[test]
    fn test_flag_replaces_malformed_environment() {
        let args = parse(&["patients", "list", "--base-url", "http://good.test"]);
        let source = args.source_with(env("not a url", "12")).unwrap();
        assert_eq!(
            source,
            Source::Remote(ClientConfig::new("http://good.test").with_timeout(Duration::from_secs(12)))
        );

        let args = parse(&["patients", "list"]);
        assert!(matches!(
            args.source_with(env("not a url", "12")),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Args::try_parse_from(["patients", "--timeout", "0", "list"]).is_err());
    }

    #[test]
    fn test_local_conflicts_with_base_url() {
        let result = Args::try_parse_from([
            "patients", "--local", "x.db", "--base-url", "http://a", "list",
        ]);
        assert!(result.is_err());
    }
}
