//! Logging configuration
//!
//! Everything here is serde-friendly and defaults field by field, so a
//! forwarder config file only has to mention what it changes:
//!
//! ```json
//! { "filter": "info,nfwd_table=debug", "console": { "pretty": { "ansi": true } } }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where and how the forwarder's events are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,

    pub console: ConsoleFormat,

    /// Rolling JSON file output, off when `None`
    pub file: Option<FileOutput>,

    /// Fields included in JSON output (console and file)
    pub json: JsonFields,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            console: ConsoleFormat::Json,
            file: None,
            json: JsonFields::default(),
        }
    }
}

impl LogConfig {
    /// Pretty console at debug level
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            console: ConsoleFormat::Pretty { ansi: true },
            ..Default::default()
        }
    }

    /// JSON files under `directory`, no console
    ///
    /// Per-Interest table events are kept out of production logs.
    pub fn production(directory: PathBuf) -> Self {
        Self {
            filter: "info,nfwd_table=warn".to_string(),
            console: ConsoleFormat::Off,
            file: Some(FileOutput::new(directory)),
            json: JsonFields {
                source_location: false,
                ..JsonFields::default()
            },
        }
    }

    /// Plain console, warnings and errors only
    pub fn testing() -> Self {
        Self {
            filter: "warn".to_string(),
            console: ConsoleFormat::Pretty { ansi: false },
            ..Default::default()
        }
    }
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleFormat {
    /// No console output
    Off,
    /// One JSON object per line on stdout
    #[default]
    Json,
    /// Human-readable lines
    Pretty { ansi: bool },
}

impl ConsoleFormat {
    pub fn is_enabled(self) -> bool {
        self != ConsoleFormat::Off
    }
}

/// Rolling file output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutput {
    pub directory: PathBuf,
    /// File name prefix; rotated files get a date suffix
    pub prefix: String,
    pub rotation: FileRotation,
    /// Rotated files to keep; all are kept when `None`
    pub keep: Option<usize>,
}

impl FileOutput {
    /// Daily-rotated `nfwd.*` files in `directory`, one week retained
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: "nfwd".to_string(),
            rotation: FileRotation::Daily,
            keep: Some(7),
        }
    }
}

impl Default for FileOutput {
    fn default() -> Self {
        Self::new("./logs")
    }
}

/// When a new log file is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileRotation {
    #[default]
    Daily,
    Hourly,
    /// A single `<prefix>.log`, truncated at startup
    Never,
}

/// Fields included in each JSON line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFields {
    /// Put event fields at the top level instead of under `fields`
    pub flatten: bool,
    /// Every span from the root to the event
    pub span_list: bool,
    /// The innermost span
    pub current_span: bool,
    /// Thread id and name
    pub thread: bool,
    /// Source file and line
    pub source_location: bool,
}

impl Default for JsonFields {
    fn default() -> Self {
        Self {
            flatten: true,
            span_list: true,
            current_span: true,
            thread: false,
            source_location: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_json_console() {
        let config = LogConfig::default();
        assert_eq!(config.filter, "info");
        assert_eq!(config.console, ConsoleFormat::Json);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_presets() {
        let dev = LogConfig::development();
        assert_eq!(dev.filter, "debug");
        assert_eq!(dev.console, ConsoleFormat::Pretty { ansi: true });

        let test = LogConfig::testing();
        assert_eq!(test.filter, "warn");
        assert!(test.console.is_enabled());

        let prod = LogConfig::production(PathBuf::from("/var/log/nfwd"));
        assert!(!prod.console.is_enabled());
        assert!(prod.filter.contains("nfwd_table=warn"));
        let file = prod.file.unwrap();
        assert_eq!(file.directory, PathBuf::from("/var/log/nfwd"));
        assert_eq!(file.prefix, "nfwd");
        assert_eq!(file.keep, Some(7));
        assert!(!prod.json.source_location);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: LogConfig = serde_json::from_str(
            r#"{"filter":"trace","console":{"pretty":{"ansi":false}},"file":{"rotation":"hourly"}}"#,
        )
        .unwrap();
        assert_eq!(config.filter, "trace");
        assert_eq!(config.console, ConsoleFormat::Pretty { ansi: false });
        let file = config.file.unwrap();
        assert_eq!(file.rotation, FileRotation::Hourly);
        assert_eq!(file.prefix, "nfwd");
        assert_eq!(config.json, JsonFields::default());
    }

    #[test]
    fn test_console_off_from_json() {
        let config: LogConfig = serde_json::from_str(r#"{"console":"off"}"#).unwrap();
        assert!(!config.console.is_enabled());
    }
}
