//! FIB behaviour tests
//!
//! Exercise next-hop list invariants and pending-Interest redistribution
//! through the public name tree API.

use std::collections::HashSet;
use std::sync::Arc;

use nfwd_core::{Face, FaceId, Interest, MockFace, Name};
use nfwd_table::{NameTree, NextHopChange, fib};

// Test helpers
fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

fn make_face(id: u64) -> (Arc<MockFace>, Arc<dyn Face>) {
    let mock = Arc::new(MockFace::new(id));
    let face: Arc<dyn Face> = mock.clone();
    (mock, face)
}

fn hops(entry: &fib::Entry) -> Vec<(u64, u64, u64)> {
    entry
        .next_hops()
        .iter()
        .map(|h| (h.face_id().0, h.endpoint_id(), h.cost()))
        .collect()
}

fn assert_invariants(entry: &fib::Entry) {
    let identities: HashSet<(FaceId, u64)> = entry
        .next_hops()
        .iter()
        .map(|h| (h.face_id(), h.endpoint_id()))
        .collect();
    assert_eq!(identities.len(), entry.next_hops().len(), "duplicate identity");
    assert!(
        entry
            .next_hops()
            .windows(2)
            .all(|w| w[0].cost() <= w[1].cost()),
        "next hops not sorted: {:?}",
        hops(entry)
    );
}

#[test]
fn test_sorted_example() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    let (_, f2) = make_face(2);
    let (_, f3) = make_face(3);
    let prefix = name("/example");

    tree.add_or_update_next_hop(&prefix, &f1, 0, 5);
    tree.add_or_update_next_hop(&prefix, &f2, 0, 2);
    assert_eq!(
        hops(tree.fib_find_exact(&prefix).unwrap()),
        vec![(2, 0, 2), (1, 0, 5)]
    );

    tree.add_or_update_next_hop(&prefix, &f3, 0, 1);
    assert_eq!(
        hops(tree.fib_find_exact(&prefix).unwrap()),
        vec![(3, 0, 1), (2, 0, 2), (1, 0, 5)]
    );
}

#[test]
fn test_invariants_under_mixed_mutations() {
    let mut tree = NameTree::new();
    let faces: Vec<Arc<dyn Face>> = (1..=4).map(|i| make_face(i).1).collect();
    let prefix = name("/mixed");

    // Deterministic pseudo-random sequence
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for _ in 0..500 {
        let r = next();
        let face = &faces[(r % 4) as usize];
        let endpoint = (r >> 8) % 3;
        let cost = (r >> 16) % 10;
        match (r >> 32) % 4 {
            0 | 1 => {
                tree.add_or_update_next_hop(&prefix, face, endpoint, cost);
            }
            2 => {
                tree.remove_next_hop(&prefix, face.id(), endpoint);
            }
            _ => {
                tree.remove_next_hop_by_face(face.id());
            }
        }
        if let Some(entry) = tree.fib_find_exact(&prefix) {
            assert_invariants(entry);
            assert!(entry.has_next_hops());
        }
    }
}

#[test]
fn test_idempotent_add() {
    let mut tree = NameTree::new();
    let (mock, f1) = make_face(1);
    let prefix = name("/idem");
    tree.pit_insert(Interest::new(name("/idem/x")));

    let first = tree.add_or_update_next_hop(&prefix, &f1, 2, 7);
    assert_eq!(first.change, NextHopChange::Added);
    let before = hops(tree.fib_find_exact(&prefix).unwrap());
    mock.take_sent();

    let second = tree.add_or_update_next_hop(&prefix, &f1, 2, 7);
    assert_eq!(second.change, NextHopChange::Unchanged);
    assert_eq!(second.redistributed, 0);
    assert_eq!(hops(tree.fib_find_exact(&prefix).unwrap()), before);
    assert!(mock.take_sent().is_empty());
}

#[test]
fn test_new_identity_appends_one_and_redistributes_once() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    let (mock2, f2) = make_face(2);
    let prefix = name("/a");
    tree.add_or_update_next_hop(&prefix, &f1, 0, 1);
    tree.pit_insert(Interest::new(name("/a")));
    tree.pit_insert(Interest::new(name("/a/b")));

    let update = tree.add_or_update_next_hop(&prefix, &f2, 0, 3);
    assert_eq!(update.change, NextHopChange::Added);
    assert_eq!(tree.fib_find_exact(&prefix).unwrap().next_hops().len(), 2);

    // One pass: each pending Interest sent exactly once
    assert_eq!(update.redistributed, 2);
    assert_eq!(mock2.take_sent_names(), vec![name("/a"), name("/a/b")]);
}

#[test]
fn test_remove_by_face_keeps_relative_order() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    let (_, f2) = make_face(2);
    let (_, f3) = make_face(3);
    let prefix = name("/r");
    tree.add_or_update_next_hop(&prefix, &f1, 0, 4);
    tree.add_or_update_next_hop(&prefix, &f2, 0, 1);
    tree.add_or_update_next_hop(&prefix, &f1, 1, 2);
    tree.add_or_update_next_hop(&prefix, &f3, 0, 3);

    assert_eq!(tree.remove_next_hop_by_face(FaceId(1)), 1);
    let entry = tree.fib_find_exact(&prefix).unwrap();
    assert_eq!(hops(entry), vec![(2, 0, 1), (3, 0, 3)]);
    assert!(!entry.has_next_hop(FaceId(1), 0));
    assert!(!entry.has_next_hop(FaceId(1), 1));
}

#[test]
fn test_redistribution_walks_subtree_in_preorder() {
    let mut tree = NameTree::new();
    let (mock, f1) = make_face(1);
    for uri in ["/p/b/y", "/p/a", "/p", "/p/b", "/q"] {
        tree.pit_insert(Interest::new(name(uri)));
    }

    let update = tree.add_or_update_next_hop(&name("/p"), &f1, 0, 1);
    assert_eq!(update.redistributed, 4);
    assert_eq!(
        mock.take_sent_names(),
        vec![name("/p"), name("/p/b"), name("/p/b/y"), name("/p/a")]
    );
}

#[test]
fn test_redistribution_skips_satisfied() {
    let mut tree = NameTree::new();
    let (mock, f1) = make_face(1);
    tree.pit_insert(Interest::new(name("/s/done")));
    tree.pit_insert(Interest::new(name("/s/pending")));
    tree.pit_satisfy(&name("/s/done"));

    let update = tree.add_or_update_next_hop(&name("/s"), &f1, 0, 1);
    assert_eq!(update.redistributed, 1);
    assert_eq!(mock.take_sent_names(), vec![name("/s/pending")]);
}

#[test]
fn test_redistribution_ignores_descendant_fib_entries() {
    let mut tree = NameTree::new();
    let (_, specific) = make_face(1);
    let (general_mock, general) = make_face(2);

    tree.add_or_update_next_hop(&name("/d/e"), &specific, 0, 1);
    tree.pit_insert(Interest::new(name("/d/e/f")));

    // Longest-prefix match would pick /d/e, yet the new /d hop still gets it
    let update = tree.add_or_update_next_hop(&name("/d"), &general, 0, 1);
    assert_eq!(update.redistributed, 1);
    assert_eq!(general_mock.take_sent_names(), vec![name("/d/e/f")]);

    let lpm = tree.fib_find_longest_prefix_match(&name("/d/e/f")).unwrap();
    assert_eq!(lpm.prefix(), &name("/d/e"));
}

#[test]
fn test_redistribution_does_not_modify_pit() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    let (pit_ref, _) = tree.pit_insert(Interest::new(name("/m")));

    tree.add_or_update_next_hop(&name("/m"), &f1, 0, 1);
    let entry = tree.pit_entry(pit_ref).unwrap();
    assert!(!entry.is_satisfied());
    assert!(entry.out_records().is_empty());
    assert_eq!(tree.pit_len(), 1);
}

#[test]
fn test_fib_lookup_for_pit_entry() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    tree.add_or_update_next_hop(&name("/l"), &f1, 0, 1);
    let (pit_ref, _) = tree.pit_insert(Interest::new(name("/l/m/n")));

    let entry = tree.fib_find_for_pit(pit_ref).unwrap();
    assert_eq!(entry.prefix(), &name("/l"));
    assert!(entry.node().is_some());
}

#[test]
fn test_entry_erase_keeps_pending_nodes() {
    let mut tree = NameTree::new();
    let (_, f1) = make_face(1);
    tree.add_or_update_next_hop(&name("/k"), &f1, 0, 1);
    tree.pit_insert(Interest::new(name("/k")));

    assert!(tree.remove_next_hop(&name("/k"), FaceId(1), 0));
    assert!(tree.fib_find_exact(&name("/k")).is_none());
    // Node still carries the PIT entry
    assert!(tree.find_exact(&name("/k")).is_some());
}
