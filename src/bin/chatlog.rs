//! Chatlog CLI - inspect chat histories stored by the chat application
//!
//! Lists chats, prints decoded transcripts, and decodes single raw payloads.

use anyhow::{Context, Result};
use chatlog::config::{InspectorConfig, OutputFormat, load_config};
use chatlog::error::{ChatlogError, StoreError};
use chatlog::inspect::inspect_chat;
use chatlog::payload::decode_payload;
use chatlog::render::{TextRenderer, write_json};
use chatlog::store::{RecordStore, SqliteStore};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatlog")]
#[command(version, about = "Inspect MessagePack-encoded chat histories", long_about = None)]
struct Cli {
    /// Chat database file (default: %APPDATA%/Everywhere/db/chat.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Leave soft-deleted records out of transcripts
    #[arg(long)]
    hide_deleted: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List chats
    Chats,

    /// Print the transcript of a chat, prompting for an id when omitted
    Show {
        /// Chat ID
        chat_id: Option<String>,
    },

    /// Decode one raw payload file ("-" reads stdin)
    Decode {
        /// Payload file
        file: PathBuf,
    },
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse().map_err(|err: ChatlogError| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => InspectorConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database = db;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if cli.hide_deleted {
        config.hide_deleted_nodes = true;
    }

    match cli.command {
        Commands::Chats => {
            let Some(store) = open_store(&config) else {
                return Ok(ExitCode::FAILURE);
            };
            let chats = store.list_chats()?;
            let stdout = io::stdout().lock();
            match config.format {
                OutputFormat::Text => TextRenderer::new(stdout).chat_list(&chats)?,
                OutputFormat::Json => write_json(stdout, &chats)?,
            }
        }

        Commands::Show { chat_id } => {
            let Some(store) = open_store(&config) else {
                return Ok(ExitCode::FAILURE);
            };

            let chat_id = match chat_id {
                Some(id) => id.trim().to_string(),
                None => {
                    TextRenderer::new(io::stdout().lock()).chat_list(&store.list_chats()?)?;
                    prompt_chat_id()?
                }
            };
            if chat_id.is_empty() {
                println!("No ID entered.");
                return Ok(ExitCode::SUCCESS);
            }

            let transcript = match inspect_chat(&store, &chat_id) {
                Ok(transcript) => transcript,
                Err(ChatlogError::Store(StoreError::ChatNotFound(_))) => {
                    println!("Invalid Chat ID.");
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.into()),
            };

            let stdout = io::stdout().lock();
            match config.format {
                OutputFormat::Text => TextRenderer::new(stdout).transcript(&transcript)?,
                OutputFormat::Json => write_json(stdout, &transcript)?,
            }
        }

        Commands::Decode { file } => {
            let bytes = read_payload(&file)?;
            let decoded = decode_payload(&bytes);
            let stdout = io::stdout().lock();
            match config.format {
                OutputFormat::Text => TextRenderer::new(stdout).payload(&decoded)?,
                OutputFormat::Json => write_json(stdout, &decoded)?,
            }
            if !decoded.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Open the database, reporting a failure once on stderr.
fn open_store(config: &InspectorConfig) -> Option<SqliteStore> {
    match SqliteStore::open(&config.database, config.hide_deleted_nodes) {
        Ok(store) => Some(store),
        Err(err) => {
            eprintln!("Error connecting to database: {}", err);
            None
        }
    }
}

fn prompt_chat_id() -> Result<String> {
    print!("\nEnter Chat ID to view: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read chat id")?;
    Ok(line.trim().to_string())
}

fn read_payload(file: &Path) -> Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Failed to read payload from stdin")?;
        return Ok(bytes);
    }
    std::fs::read(file).with_context(|| format!("Failed to read payload file: {:?}", file))
}
