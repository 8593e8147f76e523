//! Strategy choice table
//!
//! Maps name prefixes to strategy instances. The effective strategy for a
//! name is the one chosen for its longest matching prefix; the root prefix
//! always has one, so every name resolves.
//!
//! Each choice is also recorded on the name tree node for its prefix, which
//! keeps the node alive and makes the choice visible to diagnostics walking
//! the tree.

use std::collections::HashMap;
use std::sync::Arc;

use nfwd_core::Name;
use nfwd_table::{NameTree, StrategyChoiceRecord};
use tracing::{debug, instrument, warn};

use crate::error::StrategyError;
use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;

/// Prefix → strategy instance
#[derive(Debug)]
pub struct StrategyChoice {
    instances: HashMap<Name, Arc<dyn Strategy>>,
    registry: &'static StrategyRegistry,
}

impl StrategyChoice {
    /// Create a table whose root prefix uses `default_instance`
    pub fn new(tree: &mut NameTree, default_instance: &Name) -> Result<Self, StrategyError> {
        Self::with_registry(StrategyRegistry::global(), tree, default_instance)
    }

    /// Like [`new`](Self::new), resolving strategies through `registry`
    pub fn with_registry(
        registry: &'static StrategyRegistry,
        tree: &mut NameTree,
        default_instance: &Name,
    ) -> Result<Self, StrategyError> {
        let mut choice = Self {
            instances: HashMap::new(),
            registry,
        };
        choice.insert(tree, &Name::new(), default_instance)?;
        Ok(choice)
    }

    /// Choose `instance_name` for `prefix`
    ///
    /// The strategy is constructed before anything is replaced; on failure
    /// the previous choice for `prefix` stays in effect.
    #[instrument(skip(self, tree, prefix, instance_name), fields(prefix = %prefix, instance = %instance_name))]
    pub fn insert(
        &mut self,
        tree: &mut NameTree,
        prefix: &Name,
        instance_name: &Name,
    ) -> Result<(), StrategyError> {
        let strategy = self.registry.create(instance_name).map_err(|e| {
            warn!(error = %e, "Rejected strategy choice");
            e
        })?;

        tree.set_strategy_choice(StrategyChoiceRecord {
            prefix: prefix.clone(),
            instance_name: strategy.instance_name().clone(),
        });
        self.instances.insert(prefix.clone(), strategy);
        debug!("Strategy chosen");
        Ok(())
    }

    /// Remove the choice for exactly `prefix`
    ///
    /// Returns whether a choice was removed. The root choice cannot be
    /// removed.
    pub fn erase(&mut self, tree: &mut NameTree, prefix: &Name) -> Result<bool, StrategyError> {
        if prefix.is_empty() {
            return Err(StrategyError::CannotEraseRoot);
        }
        tree.clear_strategy_choice(prefix);
        Ok(self.instances.remove(prefix).is_some())
    }

    /// Strategy chosen for exactly `prefix`
    pub fn get(&self, prefix: &Name) -> Option<&Arc<dyn Strategy>> {
        self.instances.get(prefix)
    }

    /// Effective strategy for `name`, by longest-prefix match
    pub fn find_effective(&self, name: &Name) -> Option<&Arc<dyn Strategy>> {
        (0..=name.len())
            .rev()
            .find_map(|len| self.instances.get(&name.get_prefix(len)))
    }

    /// Number of prefixes with a choice, including the root
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Always false: the root has a choice
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
