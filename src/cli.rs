use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::AppError;
use crate::models::{Record, SubmissionIndex};
use crate::state::SharedState;
use crate::submission::{parser, pipeline};
use crate::upload::FilePicker;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local intake form submissions")]
pub struct Args {
    /// Database to use
    #[arg(long, global = true, env = "INTAKE_DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Save a new submission over the configured defaults
    #[command(display_order = 1)]
    Submit {
        /// Field assignment, repeatable: --field appName=Portal. The value is
        /// taken verbatim; use --input for multi-line text
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Read fields from a JSON or form-urlencoded file ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Format of --input: json or form (guessed when omitted)
        #[arg(long)]
        format: Option<String>,
    },

    /// List every saved submission as JSON lines
    #[command(display_order = 2)]
    List,

    /// Show one submission
    #[command(display_order = 3)]
    Show { id: i64 },

    /// Find submissions by requestor, appName or dateRequested
    #[command(display_order = 4)]
    Lookup {
        #[arg(long)]
        by: SubmissionIndex,
        value: String,
    },

    /// Delete a submission by id
    #[command(display_order = 5)]
    Delete { id: i64 },

    /// Export submissions to a spreadsheet
    #[command(display_order = 6)]
    Export {
        /// Output file (defaults to INTAKE_EXPORT_FILE)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Append to the running export ledger and write the whole ledger
        #[arg(long)]
        accumulate: bool,
    },

    /// Read records from the first sheet of a spreadsheet
    #[command(display_order = 7)]
    Import { file: PathBuf },

    /// Print the default record a new submission starts from
    #[command(display_order = 8)]
    Defaults,
}

/// Run one command. Output goes to stdout; the caller reports errors.
pub async fn run(state: &SharedState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Submit {
            fields,
            input,
            format,
        } => {
            let mut record = match input {
                Some(path) => read_input(&path, format.as_deref()).await?,
                None => Record::new(),
            };
            let assignments = parser::parse_assignments(&fields).map_err(AppError::Validation)?;
            record.extend(assignments);

            let result = pipeline::run(state, record).await?;
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            println!("{}", result.submission_id);
        }
        Command::List => {
            for submission in state.store.list_all().await? {
                println!("{}", to_json(&submission)?);
            }
        }
        Command::Show { id } => {
            let submission = state
                .store
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Submission {id} not found")))?;
            println!("{}", to_json_pretty(&submission)?);
        }
        Command::Lookup { by, value } => {
            for submission in state.store.find_by(by, &value).await? {
                println!("{}", to_json(&submission)?);
            }
        }
        Command::Delete { id } => {
            state.store.delete_by_id(id).await?;
            println!("Deleted {id}");
        }
        Command::Export { file, accumulate } => {
            let path = file.unwrap_or_else(|| state.config.export_file.clone());
            let submissions = state.store.list_all().await?;
            if submissions.is_empty() {
                return Err(AppError::Validation(
                    "There are no form submissions to export.".to_string(),
                ));
            }

            let records: Vec<Record> = submissions.iter().map(|s| s.to_record()).collect();
            let ok = if accumulate {
                state
                    .exporter
                    .export_accumulated(&state.ledger(), &records, &path)
                    .await
            } else {
                state.exporter.export(&records, &path).await
            };

            if !ok {
                return Err(AppError::Export(format!(
                    "Failed to export data to {}",
                    path.display()
                )));
            }
            println!("Exported to {}", path.display());
        }
        Command::Import { file } => {
            let picker = FilePicker::from_config(&state.config.import)?;
            let Some(selected) = picker.select(Some(file.as_path())).await? else {
                return Ok(());
            };
            for record in crate::export::import(&selected.path).await? {
                println!("{}", to_json(&record)?);
            }
        }
        Command::Defaults => {
            println!("{}", to_json_pretty(state.defaults.record())?);
        }
    }

    Ok(())
}

async fn read_input(path: &Path, format: Option<&str>) -> Result<Record, AppError> {
    let bytes = if path.as_os_str() == "-" {
        use tokio::io::AsyncReadExt;
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(path).await?
    };

    let content_type = format.or_else(|| match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some("json"),
        _ => None,
    });

    parser::parse_body(content_type, &bytes).map_err(AppError::Parse)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Parse(e.to_string()))
}

fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Parse(e.to_string()))
}
