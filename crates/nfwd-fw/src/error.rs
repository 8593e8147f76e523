//! Forwarding error types

use nfwd_core::{FaceError, Name, NameError};
use thiserror::Error;

/// Errors that can occur in the forwarding pipeline
#[derive(Debug, Error)]
pub enum FwError {
    /// Face-related errors
    #[error("Face error: {0}")]
    Face(#[from] FaceError),

    /// Strategy construction or selection errors
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    /// Name parsing errors
    #[error("Name error: {0}")]
    Name(#[from] NameError),

    /// Invalid forwarder configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Strategy configuration errors
///
/// Raised synchronously while instantiating or selecting a strategy. A
/// failed attempt leaves every installed strategy in place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// Instance name is malformed or names a different strategy
    #[error("Invalid strategy instance name: {0}")]
    InvalidInstanceName(String),

    /// Parameters given to a strategy that takes none
    #[error("Strategy {strategy} does not accept parameters (got {parameters})")]
    ParametersNotAccepted { strategy: Name, parameters: Name },

    /// Declared version differs from the supported one
    #[error("Strategy {strategy} does not support version {version}")]
    UnsupportedVersion { strategy: Name, version: u64 },

    /// No registered strategy matches the instance name
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(Name),

    /// The root prefix must always have a strategy
    #[error("Cannot erase the strategy choice of the root prefix")]
    CannotEraseRoot,
}

impl StrategyError {
    /// Check if this error rejects a configuration change
    ///
    /// Every strategy error is; callers keep the previously active strategy.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            StrategyError::InvalidInstanceName(_)
                | StrategyError::ParametersNotAccepted { .. }
                | StrategyError::UnsupportedVersion { .. }
                | StrategyError::UnknownStrategy(_)
                | StrategyError::CannotEraseRoot
        )
    }
}

/// Result type for forwarding operations
pub type FwResult<T> = Result<T, FwError>;
