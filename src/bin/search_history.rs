//! Search history maintenance tool.
//!
//! Operates on a file-backed history directory: list, record, clear, export
//! and import searches. Logging goes to stderr and is controlled by
//! `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use search_history::config::{load_config_file, HistoryConfig};
use search_history::history::{HistoryError, SearchHistoryService, SearchParams, SearchType};
use search_history::storage::FileStore;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "search-history", version, about = "Inspect and maintain search history")]
struct Cli {
    /// History directory (overrides the settings file)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// JSON settings file with a "search-history" section
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered search types
    Types,
    /// Show the history of a search type
    List {
        search_type: String,
        /// Print raw JSON records instead of display lines
        #[arg(long)]
        json: bool,
    },
    /// Record a search, given as field=value pairs
    Save {
        search_type: String,
        fields: Vec<String>,
    },
    /// Clear one search type, or every type when none is given
    Clear { search_type: Option<String> },
    /// Export history as JSON to stdout or a file
    Export {
        #[arg(long = "type")]
        search_type: Option<String>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import history from a JSON export
    Import { file: PathBuf },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Config(#[from] search_history::config::ConfigError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => HistoryConfig::default(),
    };

    let dir = cli
        .dir
        .clone()
        .or_else(|| config.storage_dir.clone())
        .or_else(FileStore::default_dir)
        .ok_or_else(|| CliError::Usage("could not determine history directory; pass --dir".into()))?;
    tracing::debug!("Using history directory {}", dir.display());

    let service = SearchHistoryService::with_config(FileStore::new(dir), config)?;

    match cli.command {
        Command::Types => {
            for search_type in SearchType::ALL {
                println!("{}\t{}", search_type, search_type.fields().join(", "));
            }
        }
        Command::List { search_type, json } => {
            let search_type: SearchType = search_type.parse().map_err(CliError::History)?;
            let records = service.get_history(search_type).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No {} history", search_type);
            } else {
                for record in &records {
                    let display = service.get_history_display_value(search_type, record);
                    println!("{}", display.title);
                    for line in display.details.lines() {
                        println!("    {}", line);
                    }
                }
            }
        }
        Command::Save { search_type, fields } => {
            let params = parse_fields(&fields)?;
            let history = service.save_search_by_name(&search_type, params).await?;
            println!("Saved ({} in history)", history.len());
        }
        Command::Clear { search_type: Some(name) } => {
            service.clear_history_by_name(&name).await?;
            println!("Cleared {} history", name);
        }
        Command::Clear { search_type: None } => {
            service.clear_all_history().await?;
            println!("Cleared all history");
        }
        Command::Export {
            search_type,
            output,
        } => {
            let search_type = search_type
                .map(|name| name.parse::<SearchType>())
                .transpose()?;
            let export = service.export_history(search_type).await;
            let json = serde_json::to_string_pretty(&export)?;
            match output {
                Some(path) => std::fs::write(&path, json).map_err(|source| CliError::Io { path, source })?,
                None => println!("{}", json),
            }
        }
        Command::Import { file } => {
            let contents = std::fs::read_to_string(&file).map_err(|source| CliError::Io {
                path: file.clone(),
                source,
            })?;
            let data: Value = serde_json::from_str(&contents)?;
            let object = data
                .as_object()
                .ok_or_else(|| CliError::Usage("import file must hold a JSON object".into()))?;
            let imported = service.import_history(object).await?;
            println!("Imported {} search type(s)", imported);
        }
    }

    Ok(())
}

/// Parses `field=value` arguments. Values that parse as JSON numbers or
/// booleans keep that type; everything else is a string.
fn parse_fields(fields: &[String]) -> Result<SearchParams, CliError> {
    let mut params = SearchParams::new();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("expected field=value, got {:?}", field)))?;
        let value = match serde_json::from_str::<Value>(value) {
            Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
            _ => Value::String(value.to_string()),
        };
        params.insert(name, value);
    }
    Ok(params)
}
