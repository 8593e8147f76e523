//! Name tree indexing FIB, PIT and strategy-choice state by name
//!
//! The [`NameTree`] is an arena of [`Node`]s, one per name prefix that has
//! state attached (or has a descendant that does). Nodes reference each
//! other through [`NodeId`] handles, never through owning pointers, so a FIB
//! entry can hold a back-reference to its node without extending its
//! lifetime.
//!
//! Nodes are garbage-collected bottom-up once they carry no FIB entry, no
//! strategy choice, no PIT entries and no children. The root node `/` is
//! never removed.

use std::collections::HashMap;

use nfwd_core::Name;
use tracing::trace;

use crate::fib;
use crate::pit::PitEntry;

/// Handle to a node in a [`NameTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node `/`
    pub const ROOT: NodeId = NodeId(0);

    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which strategy instance governs a prefix
///
/// Stored on the node for diagnostics; the strategy instance itself lives in
/// the forwarder's strategy-choice table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyChoiceRecord {
    /// Prefix the choice applies to
    pub prefix: Name,
    /// Fully-qualified strategy instance name
    pub instance_name: Name,
}

/// A name tree node
#[derive(Debug)]
pub struct Node {
    name: Name,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub(crate) fib_entry: Option<fib::Entry>,
    pub(crate) strategy_choice: Option<StrategyChoiceRecord>,
    pub(crate) pit_entries: Vec<PitEntry>,
}

impl Node {
    fn new(name: Name, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            fib_entry: None,
            strategy_choice: None,
            pit_entries: Vec::new(),
        }
    }

    /// Name of this node
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Parent node (`None` for the root)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// FIB entry owned by this node
    pub fn fib_entry(&self) -> Option<&fib::Entry> {
        self.fib_entry.as_ref()
    }

    /// Strategy choice recorded on this node
    pub fn strategy_choice(&self) -> Option<&StrategyChoiceRecord> {
        self.strategy_choice.as_ref()
    }

    /// PIT entries whose Interest name equals this node's name
    pub fn pit_entries(&self) -> &[PitEntry] {
        &self.pit_entries
    }

    /// Check if this node has PIT entries
    pub fn has_pit_entries(&self) -> bool {
        !self.pit_entries.is_empty()
    }

    /// Check if the node carries no state and can be collected
    fn is_empty(&self) -> bool {
        self.fib_entry.is_none()
            && self.strategy_choice.is_none()
            && self.pit_entries.is_empty()
            && self.children.is_empty()
    }
}

/// Arena-backed name tree
#[derive(Debug)]
pub struct NameTree {
    /// Node slots; `None` marks a free slot
    nodes: Vec<Option<Node>>,
    /// Free slots available for reuse
    free: Vec<usize>,
    /// Exact-name index
    index: HashMap<Name, NodeId>,
    /// Number of FIB entries
    pub(crate) n_fib_entries: usize,
    /// Number of PIT entries
    pub(crate) n_pit_entries: usize,
    /// Next PIT token
    pub(crate) next_pit_token: u64,
}

impl NameTree {
    /// Create a tree holding only the root node
    pub fn new() -> Self {
        let root = Name::new();
        let mut index = HashMap::new();
        index.insert(root.clone(), NodeId::ROOT);
        Self {
            nodes: vec![Some(Node::new(root, None))],
            free: Vec::new(),
            index,
            n_fib_entries: 0,
            n_pit_entries: 0,
            next_pit_token: 0,
        }
    }

    /// Number of live nodes, including the root
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// A tree always holds the root node
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get a node by handle
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Find the node for exactly `name`
    pub fn find_exact(&self, name: &Name) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Find or create the node for `name`, creating missing ancestors
    pub fn lookup(&mut self, name: &Name) -> NodeId {
        if let Some(id) = self.find_exact(name) {
            return id;
        }

        let mut parent = NodeId::ROOT;
        for len in 1..=name.len() {
            let prefix = name.get_prefix(len);
            parent = match self.find_exact(&prefix) {
                Some(id) => id,
                None => self.insert_child(parent, prefix),
            };
        }
        parent
    }

    fn insert_child(&mut self, parent: NodeId, name: Name) -> NodeId {
        let node = Node::new(name.clone(), Some(parent));
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        trace!(name = %name, node = id.0, "Inserted name tree node");
        self.index.insert(name, id);
        id
    }

    /// Deepest existing node whose name is a prefix of `name`
    pub fn find_deepest_prefix(&self, name: &Name) -> NodeId {
        (0..=name.len())
            .rev()
            .find_map(|len| self.find_exact(&name.get_prefix(len)))
            .unwrap_or(NodeId::ROOT)
    }

    /// Walk from `start` towards the root, returning the first node matching `pred`
    pub fn find_ancestor<P>(&self, start: NodeId, pred: P) -> Option<NodeId>
    where
        P: Fn(&Node) -> bool,
    {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.get(id)?;
            if pred(node) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    /// Longest-prefix match of `name` over nodes matching `pred`
    pub fn find_longest_prefix_match<P>(&self, name: &Name, pred: P) -> Option<NodeId>
    where
        P: Fn(&Node) -> bool,
    {
        self.find_ancestor(self.find_deepest_prefix(name), pred)
    }

    /// Remove `id` and then each ancestor while they carry no state
    ///
    /// Returns the number of nodes removed.
    pub fn erase_if_empty(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut current = id;
        while current != NodeId::ROOT {
            let parent = match self.get(current) {
                Some(node) if node.is_empty() => node.parent,
                _ => break,
            };
            if let Some(node) = self.nodes[current.0].take() {
                self.index.remove(&node.name);
                self.free.push(current.0);
                trace!(name = %node.name, node = current.0, "Erased name tree node");
                removed += 1;
            }
            match parent {
                Some(p) => {
                    if let Some(parent_node) = self.get_mut(p) {
                        parent_node.children.retain(|c| *c != current);
                    }
                    current = p;
                }
                None => break,
            }
        }
        removed
    }

    /// All live nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    /// Record the strategy choice for `record.prefix`
    pub fn set_strategy_choice(&mut self, record: StrategyChoiceRecord) -> NodeId {
        let id = self.lookup(&record.prefix);
        if let Some(node) = self.get_mut(id) {
            node.strategy_choice = Some(record);
        }
        id
    }

    /// Clear the strategy choice recorded for exactly `prefix`
    pub fn clear_strategy_choice(&mut self, prefix: &Name) -> Option<StrategyChoiceRecord> {
        let id = self.find_exact(prefix)?;
        let record = self.get_mut(id)?.strategy_choice.take();
        self.erase_if_empty(id);
        record
    }

    /// Longest-prefix match over strategy choice records
    pub fn find_strategy_choice(&self, name: &Name) -> Option<&StrategyChoiceRecord> {
        let id = self.find_longest_prefix_match(name, |node| node.strategy_choice.is_some())?;
        self.get(id)?.strategy_choice()
    }
}

impl Default for NameTree {
    fn default() -> Self {
        Self::new()
    }
}
