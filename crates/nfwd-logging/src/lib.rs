//! Structured logging for nfwd
//!
//! The forwarding crates only emit `tracing` events. This crate installs the
//! subscriber that writes them out:
//!
//! - JSON lines on stdout (the default) or pretty human-readable lines
//! - Optional rolling JSON files through `tracing-appender`
//! - Forwarder label and instance id attached to every span opened under a
//!   [`ForwarderContextGuard`]
//!
//! ```ignore
//! use nfwd_logging::{LogConfig, NfwdSubscriberBuilder};
//!
//! // Keep the guard alive while file output is in use
//! let _guard = NfwdSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::{ConsoleFormat, FileOutput, FileRotation, JsonFields, LogConfig};
pub use context::{ForwarderContextData, ForwarderContextGuard};
pub use layers::{ForwarderContextExtension, ForwarderContextLayer};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create rolling appender: {0}")]
    Appender(#[from] InitError),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder for the process-wide subscriber
#[derive(Debug, Default)]
pub struct NfwdSubscriberBuilder {
    config: LogConfig,
}

impl NfwdSubscriberBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Filter directives used when `RUST_LOG` is unset
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = filter.into();
        self
    }

    pub fn with_console(mut self, console: ConsoleFormat) -> Self {
        self.config.console = console;
        self
    }

    pub fn with_file(mut self, file: FileOutput) -> Self {
        self.config.file = Some(file);
        self
    }

    /// Install the subscriber, reporting failure on stderr
    ///
    /// The returned guard flushes file output when dropped.
    pub fn init(self) -> Option<WorkerGuard> {
        self.try_init().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        })
    }

    /// Install the subscriber
    ///
    /// Fails if the log file cannot be opened or a global subscriber is
    /// already set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LogError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.filter));
        let json = self.config.json;

        let mut outputs: Vec<BoxedLayer> = vec![ForwarderContextLayer::new().boxed()];
        match self.config.console {
            ConsoleFormat::Off => {}
            ConsoleFormat::Json => outputs.push(layers::jsonl_layer(json, std::io::stdout).boxed()),
            ConsoleFormat::Pretty { ansi } => outputs.push(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .boxed(),
            ),
        }

        let guard = match &self.config.file {
            Some(file) => {
                let (writer, guard) = file_writer(file)?;
                outputs.push(layers::jsonl_layer(json, writer).boxed());
                Some(guard)
            }
            None => None,
        };

        Registry::default().with(outputs).with(filter).try_init()?;
        Ok(guard)
    }
}

/// Non-blocking writer for `file`
fn file_writer(file: &FileOutput) -> Result<(NonBlocking, WorkerGuard), LogError> {
    let rotation = match file.rotation {
        FileRotation::Daily => Rotation::DAILY,
        FileRotation::Hourly => Rotation::HOURLY,
        FileRotation::Never => {
            fs::create_dir_all(&file.directory)?;
            let log = File::create(file.directory.join(format!("{}.log", file.prefix)))?;
            return Ok(tracing_appender::non_blocking(log));
        }
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&file.prefix);
    if let Some(keep) = file.keep {
        builder = builder.max_log_files(keep);
    }
    Ok(tracing_appender::non_blocking(builder.build(&file.directory)?))
}

/// Install the pretty debug-level subscriber
pub fn init_development() -> Option<WorkerGuard> {
    NfwdSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Install the warn-level subscriber used by tests
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_testing() {
    let _ = NfwdSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
