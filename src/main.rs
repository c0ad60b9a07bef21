//! Jobflow CLI Entry Point
//!
//! Offline helpers around the job creation wizard: schedule checks and
//! management of locally saved drafts.
//!
//! # Usage
//!
//! ```bash
//! # Check a cron schedule
//! jobflow check-cron "*/15 * * * *"
//!
//! # List saved drafts
//! jobflow list-drafts
//!
//! # Inspect or remove one draft
//! jobflow show-draft 3f2b0c4e-...
//! jobflow remove-draft 3f2b0c4e-... --store /tmp/saved_jobs.json
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::{debug, info, warn};

use jobflow::draft::{DraftStore, JsonFileDraftStore, SavedDraft, StreamsSelection};
use jobflow::settings::{load_settings, WizardSettings};
use jobflow::validation::validate_cron;
use jobflow::{APP_NAME, VERSION};

/// Subcommand selected on the command line.
#[derive(Debug, PartialEq)]
enum Command {
    CheckCron(String),
    ListDrafts,
    ShowDraft(String),
    RemoveDraft(String),
}

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    command: Option<Command>,
    store_path: Option<PathBuf>,
    settings_path: Option<String>,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!("Job Creation Wizard");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: jobflow [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  check-cron <EXPR>     Validate a five-field cron schedule");
    println!("  list-drafts           List locally saved job drafts");
    println!("  show-draft <ID>       Print one saved draft as JSON");
    println!("  remove-draft <ID>     Delete one saved draft");
    println!();
    println!("Options:");
    println!("  --store PATH          Saved-draft file");
    println!("                        (default: $JOBFLOW_DRAFTS or .jobflow/saved_jobs.json)");
    println!("  --settings FILE       Wizard settings YAML");
    println!("  --verbose             Enable debug logging");
    println!("  --help                Show this help message");
    println!("  --version             Show version information");
    println!();
    println!("Examples:");
    println!("  jobflow check-cron \"0 6 * * 1-5\"");
    println!("  jobflow list-drafts --store /tmp/saved_jobs.json");
}

/// Takes the value following an option or command.
fn take_value(args: &[String], i: &mut usize, what: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires {}", args[*i - 1], what))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        let command = match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
                None
            }
            "--store" => {
                let path = take_value(args, &mut i, "a path argument")?;
                config.store_path = Some(PathBuf::from(path));
                None
            }
            "--settings" => {
                config.settings_path = Some(take_value(args, &mut i, "a file argument")?);
                None
            }
            "check-cron" => Some(Command::CheckCron(take_value(args, &mut i, "an expression")?)),
            "list-drafts" => Some(Command::ListDrafts),
            "show-draft" => Some(Command::ShowDraft(take_value(args, &mut i, "a draft id")?)),
            "remove-draft" => Some(Command::RemoveDraft(take_value(args, &mut i, "a draft id")?)),
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => return Err(format!("Unexpected argument: {}", arg)),
        };

        if let Some(command) = command {
            if config.command.is_some() {
                return Err(format!("Only one command may be given, found extra '{}'", arg));
            }
            config.command = Some(command);
        }
        i += 1;
    }

    Ok(config)
}

/// Resolves the saved-draft file: flag, then settings, then the default location.
fn open_store(config: &Config, settings: &WizardSettings) -> JsonFileDraftStore {
    let store = match (&config.store_path, &settings.drafts_path) {
        (Some(path), _) => JsonFileDraftStore::new(path.clone()),
        (None, Some(path)) => JsonFileDraftStore::new(path.clone()),
        (None, None) => JsonFileDraftStore::at_default_location(),
    };
    info!("Saved drafts: {}", store.path().display());
    store
}

fn check_cron(expr: &str) -> Result<(), Box<dyn std::error::Error>> {
    validate_cron(expr)?;
    println!("{} {}", "valid".green().bold(), expr);
    Ok(())
}

/// Counts checked streams, tolerating unreadable selections.
fn stream_count(draft: &SavedDraft) -> Option<usize> {
    match StreamsSelection::from_blob(&draft.streams_config) {
        Ok(selection) => Some(selection.selected_ids().len()),
        Err(e) => {
            warn!("Draft '{}' has an unreadable stream selection: {}", draft.id, e);
            None
        }
    }
}

fn list_drafts(store: &dyn DraftStore) -> Result<(), Box<dyn std::error::Error>> {
    let drafts = store.list()?;
    if drafts.is_empty() {
        println!("{}", "No saved drafts".dimmed());
        return Ok(());
    }

    for draft in &drafts {
        let name = if draft.name.trim().is_empty() {
            "(unnamed)".dimmed().to_string()
        } else {
            draft.name.bold().to_string()
        };
        let saved_at = draft
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let streams = stream_count(draft)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());

        println!(
            "{}  {}  {} -> {}  [{}]  {} streams  saved {}",
            draft.id.cyan(),
            name,
            draft.source.connector_type,
            draft.destination.connector_type,
            draft.frequency,
            streams,
            saved_at
        );
    }
    println!();
    println!("{} draft(s)", drafts.len());
    Ok(())
}

fn show_draft(store: &dyn DraftStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let draft = store
        .get(id)?
        .ok_or_else(|| format!("No saved draft with id '{}'", id))?;
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

fn remove_draft(store: &dyn DraftStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !store.delete(id)? {
        return Err(format!("No saved draft with id '{}'", id).into());
    }
    println!("{} {}", "removed".yellow().bold(), id);
    Ok(())
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    let Some(command) = &config.command else {
        print_banner();
        print_usage();
        return Ok(());
    };

    let settings = match &config.settings_path {
        Some(path) => load_settings(path)?,
        None => WizardSettings::default(),
    };
    debug!("Settings: {:?}", settings);

    match command {
        Command::CheckCron(expr) => check_cron(expr),
        Command::ListDrafts => list_drafts(&open_store(&config, &settings)),
        Command::ShowDraft(id) => show_draft(&open_store(&config, &settings), id),
        Command::RemoveDraft(id) => remove_draft(&open_store(&config, &settings), id),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("jobflow")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_check_cron() {
        let config = parse_arguments(&args(&["check-cron", "0 * * * *"])).unwrap();
        assert_eq!(config.command, Some(Command::CheckCron("0 * * * *".to_string())));
    }

    #[test]
    fn test_parse_options_any_order() {
        let config =
            parse_arguments(&args(&["--verbose", "show-draft", "abc", "--store", "/tmp/s.json"]))
                .unwrap();
        assert!(config.verbose);
        assert_eq!(config.command, Some(Command::ShowDraft("abc".to_string())));
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_parse_missing_value() {
        let err = parse_arguments(&args(&["remove-draft"])).unwrap_err();
        assert!(err.contains("remove-draft requires a draft id"));
    }

    #[test]
    fn test_parse_rejects_two_commands() {
        assert!(parse_arguments(&args(&["list-drafts", "list-drafts"])).is_err());
    }

    #[test]
    fn test_parse_unknown_option() {
        assert!(parse_arguments(&args(&["--parallel"])).is_err());
    }

    #[test]
    fn test_store_flag_overrides_settings() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/flag.json")),
            ..Config::default()
        };
        let settings = WizardSettings {
            drafts_path: Some(PathBuf::from("/tmp/settings.json")),
            ..WizardSettings::default()
        };

        let store = open_store(&config, &settings);
        assert_eq!(store.path(), PathBuf::from("/tmp/flag.json").as_path());
    }
}
