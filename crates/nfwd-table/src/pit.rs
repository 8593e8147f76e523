//! Pending Interest Table
//!
//! PIT entries are stored on the name tree node matching their Interest name.
//! Several entries may share a node as long as their selectors differ; an
//! entry is keyed by `(name, can_be_prefix, must_be_fresh)`.
//!
//! Entries are addressed with a [`PitEntryRef`], a node handle paired with a
//! per-tree token. A ref outlives its entry safely: lookups through a stale
//! ref return `None`.

use nfwd_core::{EndpointId, FaceId, Interest, Name};
use tracing::trace;

use crate::name_tree::{NameTree, NodeId};

/// Handle to a PIT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitEntryRef {
    node: NodeId,
    token: u64,
}

impl PitEntryRef {
    /// Name tree node holding the entry
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Token unique within the owning tree
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// A face/endpoint pair an Interest was received from or sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRecord {
    pub face_id: FaceId,
    pub endpoint: EndpointId,
}

impl FaceRecord {
    pub fn new(face_id: FaceId, endpoint: EndpointId) -> Self {
        Self { face_id, endpoint }
    }
}

/// A pending Interest
#[derive(Debug, Clone)]
pub struct PitEntry {
    token: u64,
    interest: Interest,
    satisfied: bool,
    in_records: Vec<FaceRecord>,
    out_records: Vec<FaceRecord>,
}

impl PitEntry {
    fn new(token: u64, interest: Interest) -> Self {
        Self {
            token,
            interest,
            satisfied: false,
            in_records: Vec::new(),
            out_records: Vec::new(),
        }
    }

    /// The most recently received Interest for this entry
    pub fn interest(&self) -> &Interest {
        &self.interest
    }

    /// Interest name
    pub fn name(&self) -> &Name {
        &self.interest.name
    }

    /// Check if Data has satisfied this entry
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Downstreams the Interest arrived from
    pub fn in_records(&self) -> &[FaceRecord] {
        &self.in_records
    }

    /// Upstreams the Interest was forwarded to
    pub fn out_records(&self) -> &[FaceRecord] {
        &self.out_records
    }

    /// Record a downstream; returns false if already present
    pub fn insert_in_record(&mut self, record: FaceRecord) -> bool {
        insert_unique(&mut self.in_records, record)
    }

    /// Record an upstream; returns false if already present
    pub fn insert_out_record(&mut self, record: FaceRecord) -> bool {
        insert_unique(&mut self.out_records, record)
    }

    fn has_same_selectors(&self, interest: &Interest) -> bool {
        self.interest.can_be_prefix == interest.can_be_prefix
            && self.interest.must_be_fresh == interest.must_be_fresh
    }
}

fn insert_unique(records: &mut Vec<FaceRecord>, record: FaceRecord) -> bool {
    if records.contains(&record) {
        return false;
    }
    records.push(record);
    true
}

impl NameTree {
    /// Find or create the PIT entry for `interest`
    ///
    /// Returns the entry and whether it was newly created. An existing
    /// entry takes the new Interest and becomes pending again.
    pub fn pit_insert(&mut self, interest: Interest) -> (PitEntryRef, bool) {
        let node_id = self.lookup(&interest.name);

        if let Some(node) = self.get_mut(node_id) {
            if let Some(entry) = node
                .pit_entries
                .iter_mut()
                .find(|e| e.has_same_selectors(&interest))
            {
                entry.interest = interest;
                entry.satisfied = false;
                let pit_ref = PitEntryRef {
                    node: node_id,
                    token: entry.token,
                };
                return (pit_ref, false);
            }
        }

        let token = self.next_pit_token;
        self.next_pit_token += 1;
        trace!(name = %interest.name, token, "Inserted PIT entry");
        if let Some(node) = self.get_mut(node_id) {
            node.pit_entries.push(PitEntry::new(token, interest));
        }
        self.n_pit_entries += 1;
        (
            PitEntryRef {
                node: node_id,
                token,
            },
            true,
        )
    }

    /// Find the PIT entry matching `interest` name and selectors
    pub fn pit_find(&self, interest: &Interest) -> Option<PitEntryRef> {
        let node_id = self.find_exact(&interest.name)?;
        let entry = self
            .get(node_id)?
            .pit_entries()
            .iter()
            .find(|e| e.has_same_selectors(interest))?;
        Some(PitEntryRef {
            node: node_id,
            token: entry.token,
        })
    }

    /// Get a PIT entry
    pub fn pit_entry(&self, pit_ref: PitEntryRef) -> Option<&PitEntry> {
        self.get(pit_ref.node)?
            .pit_entries()
            .iter()
            .find(|e| e.token == pit_ref.token)
    }

    /// Get a PIT entry mutably
    pub fn pit_entry_mut(&mut self, pit_ref: PitEntryRef) -> Option<&mut PitEntry> {
        self.get_mut(pit_ref.node)?
            .pit_entries
            .iter_mut()
            .find(|e| e.token == pit_ref.token)
    }

    /// Mark every pending entry satisfied by Data named `data_name`
    ///
    /// Entries on the Data name's node match exactly; entries on ancestor
    /// nodes match only when their Interest allows prefix matching.
    pub fn pit_satisfy(&mut self, data_name: &Name) -> Vec<PitEntryRef> {
        let mut satisfied = Vec::new();
        let mut current = Some(self.find_deepest_prefix(data_name));

        while let Some(node_id) = current {
            let Some(node) = self.get_mut(node_id) else {
                break;
            };
            for entry in node
                .pit_entries
                .iter_mut()
                .filter(|e| !e.satisfied && e.interest.matches_data(data_name))
            {
                entry.satisfied = true;
                satisfied.push(PitEntryRef {
                    node: node_id,
                    token: entry.token,
                });
            }
            current = node.parent();
        }

        trace!(name = %data_name, count = satisfied.len(), "Satisfied PIT entries");
        satisfied
    }

    /// Erase a PIT entry, collecting its node if it becomes empty
    pub fn pit_erase(&mut self, pit_ref: PitEntryRef) -> bool {
        let Some(node) = self.get_mut(pit_ref.node) else {
            return false;
        };
        let before = node.pit_entries.len();
        node.pit_entries.retain(|e| e.token != pit_ref.token);
        let erased = node.pit_entries.len() < before;
        if erased {
            self.n_pit_entries -= 1;
            self.erase_if_empty(pit_ref.node);
        }
        erased
    }

    /// Erase every satisfied PIT entry; returns the number erased
    pub fn pit_erase_satisfied(&mut self) -> usize {
        let refs: Vec<PitEntryRef> = self
            .iter()
            .flat_map(|(node_id, node)| {
                node.pit_entries()
                    .iter()
                    .filter(|e| e.is_satisfied())
                    .map(move |e| PitEntryRef {
                        node: node_id,
                        token: e.token,
                    })
            })
            .collect();
        refs.into_iter().filter(|r| self.pit_erase(*r)).count()
    }

    /// Number of PIT entries
    pub fn pit_len(&self) -> usize {
        self.n_pit_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let mut tree = NameTree::new();
        let interest = Interest::new(name("/a/b")).with_nonce(1);

        let (pit_ref, is_new) = tree.pit_insert(interest.clone());
        assert!(is_new);
        assert_eq!(tree.pit_len(), 1);
        assert_eq!(tree.pit_find(&interest), Some(pit_ref));
        assert_eq!(tree.pit_entry(pit_ref).unwrap().name(), &name("/a/b"));

        // Same name and selectors reuse the entry
        let (again, is_new) = tree.pit_insert(interest.with_nonce(2));
        assert!(!is_new);
        assert_eq!(again, pit_ref);
        assert_eq!(tree.pit_entry(pit_ref).unwrap().interest().nonce, 2);
    }

    #[test]
    fn test_selectors_distinguish_entries() {
        let mut tree = NameTree::new();
        let (a, _) = tree.pit_insert(Interest::new(name("/a")));
        let (b, is_new) = tree.pit_insert(Interest::new(name("/a")).with_can_be_prefix(true));
        assert!(is_new);
        assert_ne!(a, b);
        assert_eq!(tree.pit_len(), 2);

        let node = tree.get(a.node()).unwrap();
        assert_eq!(node.pit_entries().len(), 2);
    }

    #[test]
    fn test_records_deduplicated() {
        let mut tree = NameTree::new();
        let (pit_ref, _) = tree.pit_insert(Interest::new(name("/a")));
        let entry = tree.pit_entry_mut(pit_ref).unwrap();

        assert!(entry.insert_in_record(FaceRecord::new(FaceId(1), 0)));
        assert!(!entry.insert_in_record(FaceRecord::new(FaceId(1), 0)));
        assert!(entry.insert_out_record(FaceRecord::new(FaceId(2), 0)));
        assert!(entry.insert_out_record(FaceRecord::new(FaceId(2), 1)));
        assert_eq!(entry.in_records().len(), 1);
        assert_eq!(entry.out_records().len(), 2);
    }

    #[test]
    fn test_satisfy_exact_and_prefix() {
        let mut tree = NameTree::new();
        let (exact, _) = tree.pit_insert(Interest::new(name("/a/b")));
        let (prefix, _) = tree.pit_insert(Interest::new(name("/a")).with_can_be_prefix(true));
        let (no_prefix, _) = tree.pit_insert(Interest::new(name("/a")));

        let satisfied = tree.pit_satisfy(&name("/a/b"));
        assert_eq!(satisfied.len(), 2);
        assert!(tree.pit_entry(exact).unwrap().is_satisfied());
        assert!(tree.pit_entry(prefix).unwrap().is_satisfied());
        assert!(!tree.pit_entry(no_prefix).unwrap().is_satisfied());

        // Already satisfied entries are not reported again
        assert!(tree.pit_satisfy(&name("/a/b")).is_empty());
    }

    #[test]
    fn test_satisfy_data_without_node() {
        let mut tree = NameTree::new();
        let (prefix, _) = tree.pit_insert(Interest::new(name("/a")).with_can_be_prefix(true));
        assert_eq!(tree.pit_satisfy(&name("/a/x/y")), vec![prefix]);
    }

    #[test]
    fn test_reinsert_clears_satisfied() {
        let mut tree = NameTree::new();
        let (pit_ref, _) = tree.pit_insert(Interest::new(name("/a")));
        tree.pit_satisfy(&name("/a"));
        tree.pit_insert(Interest::new(name("/a")));
        assert!(!tree.pit_entry(pit_ref).unwrap().is_satisfied());
    }

    #[test]
    fn test_erase_collects_nodes() {
        let mut tree = NameTree::new();
        let (pit_ref, _) = tree.pit_insert(Interest::new(name("/a/b")));
        assert_eq!(tree.len(), 3);

        assert!(tree.pit_erase(pit_ref));
        assert!(!tree.pit_erase(pit_ref));
        assert_eq!(tree.pit_len(), 0);
        assert_eq!(tree.len(), 1);
        assert!(tree.pit_entry(pit_ref).is_none());
    }

    #[test]
    fn test_erase_satisfied() {
        let mut tree = NameTree::new();
        tree.pit_insert(Interest::new(name("/a")));
        let (pending, _) = tree.pit_insert(Interest::new(name("/b")));
        tree.pit_satisfy(&name("/a"));

        assert_eq!(tree.pit_erase_satisfied(), 1);
        assert_eq!(tree.pit_len(), 1);
        assert!(tree.pit_entry(pending).is_some());
        assert!(tree.find_exact(&name("/a")).is_none());
    }
}
