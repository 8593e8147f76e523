//! Forwarding Information Base
//!
//! A FIB [`Entry`] holds one prefix's next hops, sorted ascending by cost.
//! Entries live inside [`NameTree`] nodes and keep a set-once [`NodeId`]
//! back-reference to the node that owns them.
//!
//! When a next hop is added, or an existing hop's cost changes, every
//! Interest still pending anywhere in the subtree rooted at the entry's node
//! is re-sent through that hop. This keeps Interests that arrived before a
//! route existed (for example, from a producer that has not registered yet)
//! from stalling until they expire.
//!
//! The redistribution walk deliberately ignores FIB entries owned by
//! descendant nodes: a pending Interest under a more specific prefix is still
//! re-sent through the newly valid hop.

use std::sync::Arc;

use nfwd_core::{EndpointId, Face, FaceId, Name};
use tracing::{debug, instrument, trace};

use crate::name_tree::{NameTree, NodeId};
use crate::pit::PitEntryRef;

/// A forwarding candidate: a face, an endpoint on it, and a cost
#[derive(Debug, Clone)]
pub struct NextHop {
    face: Arc<dyn Face>,
    endpoint_id: EndpointId,
    cost: u64,
}

impl NextHop {
    /// Create a next hop with cost 0
    pub fn new(face: Arc<dyn Face>, endpoint_id: EndpointId) -> Self {
        Self {
            face,
            endpoint_id,
            cost: 0,
        }
    }

    /// The outgoing face
    pub fn face(&self) -> &Arc<dyn Face> {
        &self.face
    }

    /// Identity of the outgoing face
    pub fn face_id(&self) -> FaceId {
        self.face.id()
    }

    /// Endpoint on the outgoing face
    pub fn endpoint_id(&self) -> EndpointId {
        self.endpoint_id
    }

    /// Routing cost (lower is preferred)
    pub fn cost(&self) -> u64 {
        self.cost
    }

    fn is(&self, face_id: FaceId, endpoint_id: EndpointId) -> bool {
        self.face_id() == face_id && self.endpoint_id == endpoint_id
    }
}

/// Next hops of an entry, ascending by cost
pub type NextHopList = Vec<NextHop>;

/// What `add_or_update_next_hop` did to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextHopChange {
    /// A new next hop was appended
    Added,
    /// An existing next hop's cost changed
    Updated,
    /// The next hop already existed with the same cost
    Unchanged,
}

impl NextHopChange {
    /// Check if pending Interests must be re-sent through the hop
    pub fn needs_redistribution(self) -> bool {
        !matches!(self, NextHopChange::Unchanged)
    }
}

/// Result of adding or updating a route in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHopUpdate {
    /// What happened to the entry
    pub change: NextHopChange,
    /// Number of pending Interests re-sent through the hop
    pub redistributed: usize,
}

/// A FIB entry
#[derive(Debug)]
pub struct Entry {
    prefix: Name,
    next_hops: NextHopList,
    node: Option<NodeId>,
}

impl Entry {
    /// Create a detached entry
    pub fn new(prefix: Name) -> Self {
        Self {
            prefix,
            next_hops: Vec::new(),
            node: None,
        }
    }

    /// The entry's prefix
    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    /// Next hops, ascending by cost
    pub fn next_hops(&self) -> &[NextHop] {
        &self.next_hops
    }

    /// Check if the entry has any next hop
    pub fn has_next_hops(&self) -> bool {
        !self.next_hops.is_empty()
    }

    /// Name tree node owning this entry, once attached
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Set the owning node; the first attachment wins
    pub(crate) fn attach(&mut self, node: NodeId) {
        debug_assert!(self.node.is_none(), "FIB entry attached twice");
        if self.node.is_none() {
            self.node = Some(node);
        }
    }

    fn find_next_hop(&self, face_id: FaceId, endpoint_id: EndpointId) -> Option<usize> {
        self.next_hops
            .iter()
            .position(|hop| hop.is(face_id, endpoint_id))
    }

    /// Check if there is a next hop for `face_id` with `endpoint_id`
    pub fn has_next_hop(&self, face_id: FaceId, endpoint_id: EndpointId) -> bool {
        self.find_next_hop(face_id, endpoint_id).is_some()
    }

    /// Add a next hop, or update its cost if it already exists
    ///
    /// This only updates the list. Attached entries should be mutated through
    /// [`NameTree::add_or_update_next_hop`], which also re-sends pending
    /// Interests when the returned change calls for it.
    pub fn add_or_update_next_hop(
        &mut self,
        face: &Arc<dyn Face>,
        endpoint_id: EndpointId,
        cost: u64,
    ) -> NextHopChange {
        let change = match self.find_next_hop(face.id(), endpoint_id) {
            None => {
                let mut hop = NextHop::new(Arc::clone(face), endpoint_id);
                hop.cost = cost;
                self.next_hops.push(hop);
                NextHopChange::Added
            }
            Some(i) if self.next_hops[i].cost == cost => return NextHopChange::Unchanged,
            Some(i) => {
                self.next_hops[i].cost = cost;
                NextHopChange::Updated
            }
        };
        self.sort_next_hops();
        change
    }

    /// Remove the next hop for `face_id` with `endpoint_id`
    ///
    /// Returns whether a next hop was removed.
    pub fn remove_next_hop(&mut self, face_id: FaceId, endpoint_id: EndpointId) -> bool {
        match self.find_next_hop(face_id, endpoint_id) {
            Some(i) => {
                self.next_hops.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every next hop on `face_id`, for any endpoint
    ///
    /// Returns the number of next hops removed.
    pub fn remove_next_hop_by_face(&mut self, face_id: FaceId) -> usize {
        let before = self.next_hops.len();
        self.next_hops.retain(|hop| hop.face_id() != face_id);
        before - self.next_hops.len()
    }

    fn sort_next_hops(&mut self) {
        // Stable: equal-cost hops keep their relative order
        self.next_hops.sort_by_key(|hop| hop.cost);
    }
}

/// Re-send every unsatisfied pending Interest under `root` through `hop`
///
/// Visits `root` and its descendants depth-first, skipping nodes with neither
/// children nor PIT entries. No PIT state is modified. Returns the number of
/// Interests sent.
pub fn send_pending_interests(tree: &NameTree, root: NodeId, hop: &NextHop) -> usize {
    let mut sent = 0;
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        if !node.has_children() && !node.has_pit_entries() {
            continue;
        }

        debug!(name = %node.name(), face = %hop.face_id(), "Sending pending Interests");
        if let Some(choice) = node.strategy_choice() {
            debug!(
                prefix = %choice.prefix,
                strategy = %choice.instance_name,
                "Found strategy choice"
            );
        }

        for pit_entry in node.pit_entries().iter().filter(|e| !e.is_satisfied()) {
            hop.face().send_interest(pit_entry.interest(), hop.endpoint_id());
            debug!(name = %pit_entry.name(), "Sent pending Interest");
            sent += 1;
        }

        // Reversed so children are visited in insertion order
        stack.extend(node.children().iter().rev().copied());
    }

    sent
}

impl NameTree {
    /// Find or create the FIB entry for `prefix`
    pub fn fib_insert(&mut self, prefix: &Name) -> NodeId {
        let id = self.lookup(prefix);
        let mut created = false;
        if let Some(node) = self.get_mut(id) {
            if node.fib_entry.is_none() {
                let mut entry = Entry::new(prefix.clone());
                entry.attach(id);
                node.fib_entry = Some(entry);
                created = true;
            }
        }
        if created {
            self.n_fib_entries += 1;
            trace!(prefix = %prefix, "Created FIB entry");
        }
        id
    }

    /// FIB entry for exactly `prefix`
    pub fn fib_find_exact(&self, prefix: &Name) -> Option<&Entry> {
        self.get(self.find_exact(prefix)?)?.fib_entry()
    }

    /// Longest-prefix match of `name` over FIB entries
    pub fn fib_find_longest_prefix_match(&self, name: &Name) -> Option<&Entry> {
        let id = self.find_longest_prefix_match(name, |node| node.fib_entry.is_some())?;
        self.get(id)?.fib_entry()
    }

    /// Longest-prefix match for the Interest of a PIT entry
    pub fn fib_find_for_pit(&self, pit_entry: PitEntryRef) -> Option<&Entry> {
        let id = self.find_ancestor(pit_entry.node(), |node| node.fib_entry.is_some())?;
        self.get(id)?.fib_entry()
    }

    /// All FIB entries
    pub fn fib_entries(&self) -> impl Iterator<Item = &Entry> {
        self.iter().filter_map(|(_, node)| node.fib_entry())
    }

    /// Number of FIB entries
    pub fn fib_len(&self) -> usize {
        self.n_fib_entries
    }

    /// Add a route, or update its cost, re-sending pending Interests
    ///
    /// Creates the FIB entry for `prefix` if needed. When the next hop is new
    /// or its cost changed, every unsatisfied pending Interest in the subtree
    /// of the entry's node is sent through it before this call returns.
    #[instrument(skip(self, prefix, face), fields(prefix = %prefix, face = %face.id()))]
    pub fn add_or_update_next_hop(
        &mut self,
        prefix: &Name,
        face: &Arc<dyn Face>,
        endpoint_id: EndpointId,
        cost: u64,
    ) -> NextHopUpdate {
        let id = self.fib_insert(prefix);

        let (change, hop, root) = match self.get_mut(id).and_then(|n| n.fib_entry.as_mut()) {
            Some(entry) => {
                let change = entry.add_or_update_next_hop(face, endpoint_id, cost);
                let hop = entry
                    .find_next_hop(face.id(), endpoint_id)
                    .map(|i| entry.next_hops[i].clone());
                (change, hop, entry.node())
            }
            None => (NextHopChange::Unchanged, None, None),
        };

        let redistributed = match (change.needs_redistribution(), hop, root) {
            (true, Some(hop), Some(root)) => send_pending_interests(self, root, &hop),
            _ => 0,
        };

        debug!(?change, redistributed, "Next hop updated");
        NextHopUpdate {
            change,
            redistributed,
        }
    }

    /// Remove one route; erases the FIB entry when it becomes empty
    pub fn remove_next_hop(
        &mut self,
        prefix: &Name,
        face_id: FaceId,
        endpoint_id: EndpointId,
    ) -> bool {
        let Some(id) = self.find_exact(prefix) else {
            return false;
        };
        let removed = self
            .get_mut(id)
            .and_then(|n| n.fib_entry.as_mut())
            .is_some_and(|entry| entry.remove_next_hop(face_id, endpoint_id));
        if removed {
            self.erase_fib_entry_if_empty(id);
        }
        removed
    }

    /// Remove every route through `face_id`; erases emptied FIB entries
    ///
    /// Returns the number of FIB entries that lost at least one next hop.
    #[instrument(skip(self), fields(face = %face_id))]
    pub fn remove_next_hop_by_face(&mut self, face_id: FaceId) -> usize {
        let affected: Vec<NodeId> = self
            .iter()
            .filter(|(_, node)| {
                node.fib_entry()
                    .is_some_and(|e| e.next_hops().iter().any(|h| h.face_id() == face_id))
            })
            .map(|(id, _)| id)
            .collect();

        for id in &affected {
            if let Some(entry) = self.get_mut(*id).and_then(|n| n.fib_entry.as_mut()) {
                entry.remove_next_hop_by_face(face_id);
            }
            self.erase_fib_entry_if_empty(*id);
        }

        debug!(entries = affected.len(), "Removed next hops for face");
        affected.len()
    }

    /// Erase the FIB entry for exactly `prefix`
    pub fn fib_erase(&mut self, prefix: &Name) -> bool {
        let Some(id) = self.find_exact(prefix) else {
            return false;
        };
        let erased = self
            .get_mut(id)
            .and_then(|n| n.fib_entry.take())
            .is_some();
        if erased {
            self.n_fib_entries -= 1;
            self.erase_if_empty(id);
        }
        erased
    }

    fn erase_fib_entry_if_empty(&mut self, id: NodeId) {
        let empty = self
            .get(id)
            .and_then(|n| n.fib_entry())
            .is_some_and(|e| !e.has_next_hops());
        if empty {
            if let Some(node) = self.get_mut(id) {
                node.fib_entry = None;
            }
            self.n_fib_entries -= 1;
            trace!(node = id.index(), "Erased empty FIB entry");
            self.erase_if_empty(id);
        }
    }
}
