//! Forwarding pipeline
//!
//! The [`Forwarder`] owns the name tree, the face table and the strategy
//! choice table, and is their only reader and writer. Every method takes
//! `&mut self` and runs to completion without blocking; a host that receives
//! events on several threads must serialize them before calling in.
//!
//! ## Pipelines
//!
//! - **Incoming Interest**: drop `/localhost` Interests from non-local
//!   faces, insert or refresh the PIT entry, record the downstream, and hand
//!   the Interest to the effective strategy.
//! - **Incoming Nack**: find the PIT entry and hand the Nack to the
//!   effective strategy. Nacks for unknown Interests are dropped.
//! - **Incoming Data**: mark matching PIT entries satisfied so later route
//!   changes stop re-sending them.
//!
//! Route changes run the other way: adding a next hop re-sends pending
//! Interests under its prefix before `add_route` returns.

use std::sync::Arc;

use nfwd_core::{EndpointId, Face, FaceEndpoint, FaceId, Interest, Nack, Name};
use nfwd_logging::{ForwarderContextData, ForwarderContextGuard};
use nfwd_table::{FaceRecord, NameTree, NextHopUpdate, PitEntryRef, fib};
use tracing::{debug, info, trace, warn};

use crate::config::ForwarderConfig;
use crate::error::FwResult;
use crate::face_table::FaceTable;
use crate::scope;
use crate::strategy::StrategyContext;
use crate::strategy_choice::StrategyChoice;

/// The forwarding core
#[derive(Debug)]
pub struct Forwarder {
    tree: NameTree,
    faces: FaceTable,
    strategy_choice: StrategyChoice,
    context: ForwarderContextData,
}

impl Forwarder {
    /// Create a forwarder with the default configuration
    pub fn new() -> FwResult<Self> {
        Self::with_config(&ForwarderConfig::default())
    }

    /// Create a forwarder from `config`
    ///
    /// Fails if the default strategy cannot be instantiated.
    pub fn with_config(config: &ForwarderConfig) -> FwResult<Self> {
        let context = ForwarderContextData::new(config.label.clone());
        let _guard = ForwarderContextGuard::enter(context.clone());

        let mut tree = NameTree::new();
        let strategy_choice = StrategyChoice::new(&mut tree, &config.default_strategy)?;
        info!(
            label = %context.label,
            default_strategy = %config.default_strategy,
            "Forwarder created"
        );

        Ok(Self {
            tree,
            faces: FaceTable::new(),
            strategy_choice,
            context,
        })
    }

    fn enter(&self) -> ForwarderContextGuard {
        ForwarderContextGuard::enter(self.context.clone())
    }

    /// Label and instance id used in log context
    pub fn context(&self) -> &ForwarderContextData {
        &self.context
    }

    /// The name tree holding FIB, PIT and strategy-choice state
    pub fn name_tree(&self) -> &NameTree {
        &self.tree
    }

    /// Registered faces
    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    /// Prefix to strategy table
    pub fn strategy_choice(&self) -> &StrategyChoice {
        &self.strategy_choice
    }

    // ========================================================================
    // Faces
    // ========================================================================

    /// Register a face
    pub fn add_face(&mut self, face: Arc<dyn Face>) -> FwResult<()> {
        let _guard = self.enter();
        let id = face.id();
        self.faces.add(face)?;
        debug!(face = %id, "Face added");
        Ok(())
    }

    /// Unregister a face, first removing every next hop through it
    ///
    /// Returns the number of FIB entries that lost a next hop.
    pub fn remove_face(&mut self, face_id: FaceId) -> FwResult<usize> {
        let _guard = self.enter();
        self.faces.require(face_id)?;
        let affected = self.tree.remove_next_hop_by_face(face_id);
        self.faces.remove(face_id)?;
        debug!(face = %face_id, affected, "Face removed");
        Ok(affected)
    }

    /// Look up a registered face
    pub fn face(&self, face_id: FaceId) -> Option<&Arc<dyn Face>> {
        self.faces.get(face_id)
    }

    // ========================================================================
    // Routes
    // ========================================================================

    /// Add a route through a registered face, or update its cost
    ///
    /// Pending Interests under `prefix` are re-sent through the route when
    /// it is new or its cost changed.
    pub fn add_route(
        &mut self,
        prefix: &Name,
        face_id: FaceId,
        endpoint: EndpointId,
        cost: u64,
    ) -> FwResult<NextHopUpdate> {
        let _guard = self.enter();
        let face = Arc::clone(self.faces.require(face_id)?);
        Ok(self.tree.add_or_update_next_hop(prefix, &face, endpoint, cost))
    }

    /// Remove a route through a registered face
    pub fn remove_route(
        &mut self,
        prefix: &Name,
        face_id: FaceId,
        endpoint: EndpointId,
    ) -> FwResult<bool> {
        let _guard = self.enter();
        self.faces.require(face_id)?;
        let removed = self.tree.remove_next_hop(prefix, face_id, endpoint);
        debug!(prefix = %prefix, face = %face_id, endpoint, removed, "Route removal");
        Ok(removed)
    }

    /// FIB entry for exactly `prefix`
    pub fn fib_entry(&self, prefix: &Name) -> Option<&fib::Entry> {
        self.tree.fib_find_exact(prefix)
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    /// Choose a strategy for `prefix`
    ///
    /// On failure the previous strategy for `prefix` stays in effect.
    pub fn set_strategy(&mut self, prefix: &Name, instance_name: &Name) -> FwResult<()> {
        let _guard = self.enter();
        self.strategy_choice
            .insert(&mut self.tree, prefix, instance_name)?;
        Ok(())
    }

    /// Remove the strategy choice for `prefix`; the root cannot be unset
    pub fn unset_strategy(&mut self, prefix: &Name) -> FwResult<bool> {
        let _guard = self.enter();
        Ok(self.strategy_choice.erase(&mut self.tree, prefix)?)
    }

    /// Instance name of the strategy effective for `name`
    pub fn effective_strategy_name(&self, name: &Name) -> Option<&Name> {
        self.strategy_choice
            .find_effective(name)
            .map(|strategy| strategy.instance_name())
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    /// Process an Interest received on `ingress`
    ///
    /// Returns the PIT entry, or `None` if the Interest was dropped.
    pub fn on_incoming_interest(
        &mut self,
        ingress: &FaceEndpoint,
        interest: Interest,
    ) -> Option<PitEntryRef> {
        let _guard = self.enter();
        trace!(ingress = %ingress, interest = %interest, "Incoming Interest");

        if scope::is_localhost(&interest.name) && !ingress.face.is_local() {
            debug!(ingress = %ingress, name = %interest.name, "Dropping /localhost Interest from non-local face");
            return None;
        }

        let (pit_entry, is_new) = self.tree.pit_insert(interest.clone());
        if let Some(entry) = self.tree.pit_entry_mut(pit_entry) {
            entry.insert_in_record(FaceRecord::new(ingress.face_id(), ingress.endpoint));
        }
        trace!(is_new, "PIT entry ready");

        let Some(strategy) = self.strategy_choice.find_effective(&interest.name) else {
            warn!(name = %interest.name, "No effective strategy");
            return Some(pit_entry);
        };

        let mut ctx = PipelineContext {
            tree: &mut self.tree,
            faces: &self.faces,
        };
        strategy.after_receive_interest(&mut ctx, ingress, &interest, pit_entry);
        Some(pit_entry)
    }

    /// Process a Nack received on `ingress`
    ///
    /// Returns whether a strategy was invoked.
    pub fn on_incoming_nack(&mut self, ingress: &FaceEndpoint, nack: &Nack) -> bool {
        let _guard = self.enter();
        trace!(ingress = %ingress, nack = %nack, "Incoming Nack");

        let Some(pit_entry) = self.tree.pit_find(&nack.interest) else {
            debug!(name = %nack.interest.name, "Dropping Nack, no PIT entry");
            return false;
        };
        let Some(strategy) = self.strategy_choice.find_effective(&nack.interest.name) else {
            warn!(name = %nack.interest.name, "No effective strategy");
            return false;
        };

        let mut ctx = PipelineContext {
            tree: &mut self.tree,
            faces: &self.faces,
        };
        strategy.after_receive_nack(&mut ctx, ingress, nack, pit_entry);
        true
    }

    /// Process Data named `data_name` received on `ingress`
    ///
    /// Returns the number of PIT entries satisfied.
    pub fn on_incoming_data(&mut self, ingress: &FaceEndpoint, data_name: &Name) -> usize {
        let _guard = self.enter();
        let satisfied = self.tree.pit_satisfy(data_name).len();
        debug!(ingress = %ingress, name = %data_name, satisfied, "Incoming Data");
        satisfied
    }

    /// Erase every satisfied PIT entry
    pub fn erase_satisfied(&mut self) -> usize {
        let _guard = self.enter();
        self.tree.pit_erase_satisfied()
    }
}

/// Pipeline services handed to strategies
struct PipelineContext<'a> {
    tree: &'a mut NameTree,
    faces: &'a FaceTable,
}

impl StrategyContext for PipelineContext<'_> {
    fn lookup_fib(&self, pit_entry: PitEntryRef) -> Option<&fib::Entry> {
        self.tree.fib_find_for_pit(pit_entry)
    }

    fn would_violate_scope(
        &self,
        ingress: &FaceEndpoint,
        interest: &Interest,
        egress: &dyn Face,
    ) -> bool {
        scope::would_violate_scope(ingress.face.as_ref(), interest, egress)
    }

    fn send_interest(&mut self, pit_entry: PitEntryRef, egress: &FaceEndpoint, interest: &Interest) {
        if !self.faces.contains(egress.face_id()) {
            warn!(egress = %egress, "Dropping Interest to unregistered face");
            return;
        }
        if let Some(entry) = self.tree.pit_entry_mut(pit_entry) {
            entry.insert_out_record(FaceRecord::new(egress.face_id(), egress.endpoint));
        }
        egress.face.send_interest(interest, egress.endpoint);
    }
}
