//! Inspector configuration
//!
//! Loaded from an optional JSON file; missing keys take their defaults and
//! command-line flags override the result.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ChatlogError;

/// How transcripts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ChatlogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ChatlogError::Config(format!(
                "unknown output format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Inspector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Chat database file
    pub database: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Leave soft-deleted records out of transcripts
    pub hide_deleted_nodes: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            format: OutputFormat::Text,
            hide_deleted_nodes: false,
        }
    }
}

/// Where the chat application keeps its database: under `%APPDATA%` when
/// set, otherwise `chat.db` in the working directory.
pub fn default_database_path() -> PathBuf {
    database_path_under(std::env::var_os("APPDATA").map(PathBuf::from))
}

fn database_path_under(app_data: Option<PathBuf>) -> PathBuf {
    match app_data {
        Some(root) => root.join("Everywhere").join("db").join("chat.db"),
        None => PathBuf::from("chat.db"),
    }
}

/// Load configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<InspectorConfig> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: InspectorConfig = serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("chatlog.json");
        std::fs::write(&path, br#"{"format": "json"}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.hide_deleted_nodes);
        assert_eq!(config.database, default_database_path());
    }

    #[test]
    fn full_file_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("chatlog.json");
        let config = InspectorConfig {
            database: temp.path().join("chat.db"),
            format: OutputFormat::Json,
            hide_deleted_nodes: true,
        };
        std::fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn missing_or_invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.json");
        let err = load_config(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.json"));

        let broken = temp.path().join("broken.json");
        std::fs::write(&broken, b"{ not json").unwrap();
        let err = load_config(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn database_path_follows_app_data() {
        assert_eq!(database_path_under(None), PathBuf::from("chat.db"));
        let under = database_path_under(Some(PathBuf::from("/data")));
        assert!(under.ends_with("Everywhere/db/chat.db"));
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
