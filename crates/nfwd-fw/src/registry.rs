//! Process-wide strategy registry
//!
//! Maps strategy names (without version) to factories. Creating a strategy
//! from an instance name picks the longest registered name that is a prefix
//! of the instance's strategy name, then lets that factory validate the
//! version and parameters.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use nfwd_core::Name;
use tracing::{debug, trace};

use crate::error::StrategyError;
use crate::multicast::MulticastStrategy;
use crate::strategy::{Strategy, parse_instance_name};

/// Builds a strategy from an instance name
pub type StrategyFactory = fn(&Name) -> Result<Arc<dyn Strategy>, StrategyError>;

static GLOBAL: LazyLock<StrategyRegistry> = LazyLock::new(StrategyRegistry::with_builtin);

/// Registry of strategy factories
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    factories: DashMap<Name, StrategyFactory>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in strategies
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(MulticastStrategy::base_name(), MulticastStrategy::create);
        registry
    }

    /// The process-wide registry
    pub fn global() -> &'static StrategyRegistry {
        &GLOBAL
    }

    /// Register `factory` under `strategy_name`, replacing any previous one
    ///
    /// `strategy_name` must not carry a version component.
    pub fn register(&self, strategy_name: Name, factory: StrategyFactory) {
        trace!(strategy = %strategy_name, "Registered strategy");
        self.factories.insert(strategy_name, factory);
    }

    /// Check if a strategy is registered under exactly `strategy_name`
    pub fn is_registered(&self, strategy_name: &Name) -> bool {
        self.factories.contains_key(strategy_name)
    }

    /// Names of every registered strategy
    pub fn registered_names(&self) -> Vec<Name> {
        self.factories.iter().map(|e| e.key().clone()).collect()
    }

    /// Instantiate the strategy named by `instance_name`
    pub fn create(&self, instance_name: &Name) -> Result<Arc<dyn Strategy>, StrategyError> {
        let parsed = parse_instance_name(instance_name)?;

        let factory = (0..=parsed.strategy_name.len())
            .rev()
            .find_map(|len| {
                self.factories
                    .get(&parsed.strategy_name.get_prefix(len))
                    .map(|f| *f.value())
            })
            .ok_or_else(|| StrategyError::UnknownStrategy(instance_name.clone()))?;

        let strategy = factory(instance_name)?;
        debug!(instance = %strategy.instance_name(), "Created strategy");
        Ok(strategy)
    }
}
