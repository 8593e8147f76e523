//! Forwarder configuration

use nfwd_core::Name;
use nfwd_logging::{LogConfig, NfwdSubscriberBuilder, WorkerGuard};
use serde::{Deserialize, Serialize};

use crate::error::{FwError, FwResult};
use crate::multicast::MulticastStrategy;

/// Configuration for a [`Forwarder`](crate::Forwarder)
///
/// Missing fields take their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Label attached to this forwarder's log spans
    pub label: String,
    /// Strategy instance for the root prefix
    pub default_strategy: Name,
    /// Logging configuration
    pub log: LogConfig,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            label: "nfwd".to_string(),
            default_strategy: MulticastStrategy::strategy_name(),
            log: LogConfig::default(),
        }
    }
}

impl ForwarderConfig {
    /// Create a config for development (verbose logging)
    pub fn development() -> Self {
        Self {
            log: LogConfig::development(),
            ..Default::default()
        }
    }

    /// Create a config for testing (minimal logging)
    pub fn testing() -> Self {
        Self {
            log: LogConfig::testing(),
            ..Default::default()
        }
    }

    /// Set the default strategy from an instance name URI
    pub fn set_default_strategy(&mut self, uri: &str) -> FwResult<()> {
        self.default_strategy = Name::from_uri(uri)?;
        Ok(())
    }

    /// Install the process-wide subscriber described by `log`
    ///
    /// Keep the returned guard alive while file output is in use. Only the
    /// first subscriber installed in a process takes effect.
    pub fn init_logging(&self) -> Option<WorkerGuard> {
        NfwdSubscriberBuilder::new()
            .with_config(self.log.clone())
            .init()
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> FwResult<Self> {
        serde_json::from_str(json).map_err(|e| FwError::Config(e.to_string()))
    }

    /// Serialize this config to pretty-printed JSON
    pub fn to_json(&self) -> FwResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FwError::Config(e.to_string()))
    }
}
