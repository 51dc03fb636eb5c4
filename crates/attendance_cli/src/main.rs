//! Terminal host for the attendance core.
//!
//! # Responsibility
//! - Own one `AttendanceService` per invocation (one session).
//! - Translate commands into core calls and core errors into exit codes.

use attendance_core::{
    export_table, init_logging, verify_admin, AttendanceConfig, AttendanceService,
    JsonFileRepository, RosterSheet, ServiceError,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "attendance", version, about = "Roster attendance tracker")]
struct Cli {
    /// Persisted JSON document.
    #[arg(long, env = "ATTENDANCE_DATA_PATH")]
    data: Option<PathBuf>,

    #[arg(long, env = "ATTENDANCE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "ATTENDANCE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the roster from a JSON array of records with `Nom` and `Prénom`.
    Import { file: PathBuf },
    /// List roster display keys.
    Roster,
    /// Mark people present on a date.
    Mark {
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(required = true)]
        people: Vec<String>,
    },
    /// Show the dates one person was present.
    Dates { person: String },
    /// Print presence statistics.
    Stats,
    /// Write statistics as a JSON array of export records.
    Export { out: PathBuf },
    /// Delete all roster and presence data.
    Reset {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Check administrator credentials.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> AttendanceConfig {
    let defaults = AttendanceConfig::from_env();
    AttendanceConfig {
        data_path: cli.data.clone().unwrap_or(defaults.data_path),
        log_level: cli.log_level.clone().unwrap_or(defaults.log_level),
        log_dir: cli.log_dir.clone().or(defaults.log_dir),
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli);
    config.validate()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
        info!(
            "event=cli_start module=cli status=ok core_version={}",
            attendance_core::core_version()
        );
    }

    let mut service = AttendanceService::open(JsonFileRepository::new(&config.data_path));

    match cli.command {
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let records: Vec<IndexMap<String, serde_json::Value>> = serde_json::from_str(&text)
                .map_err(|err| format!("cannot parse `{}`: {err}", file.display()))?;
            let imported = service
                .import_roster(&RosterSheet::from_records(&records))
                .map_err(|err| err.to_string())?;
            if let Some(roster) = service.roster() {
                for key in roster.duplicate_display_keys() {
                    eprintln!("warning: several people share the name `{key}`");
                }
            }
            println!("imported {imported} people");
        }
        Command::Roster => match service.roster() {
            Some(roster) => roster.display_keys().iter().for_each(|key| println!("{key}")),
            None => println!("no roster imported yet"),
        },
        Command::Mark { date, people } => {
            let outcome = service
                .mark_present(people.as_slice(), date)
                .map_err(|err| err.to_string())?;
            if outcome.weekend {
                eprintln!("warning: {date} falls on a weekend");
            }
            println!(
                "recorded {} new presences ({} already recorded)",
                outcome.newly_marked, outcome.already_present
            );
        }
        Command::Dates { person } => {
            for date in service.present_dates(&person) {
                println!("{}", date.format("%d/%m/%Y"));
            }
        }
        Command::Stats => {
            let table = export_table(&service.statistics());
            println!("{}", table.columns.join("\t"));
            for record in &table.records {
                println!("{}", record.join("\t"));
            }
        }
        Command::Export { out } => {
            let rows = service.statistics();
            let json = serde_json::to_string_pretty(&rows).map_err(|err| err.to_string())?;
            std::fs::write(&out, json)
                .map_err(|err| format!("cannot write `{}`: {err}", out.display()))?;
            println!("exported {} rows to {}", rows.len(), out.display());
        }
        Command::Reset { username, password } => match service.reset(&username, &password) {
            Ok(()) => println!("all data cleared"),
            Err(ServiceError::Unauthorized) => return Err("invalid admin credentials".into()),
            Err(err) => return Err(err.to_string()),
        },
        Command::Login { username, password } => {
            if !verify_admin(&username, &password) {
                return Err("invalid credentials".into());
            }
            println!("login ok");
        }
    }

    Ok(())
}
