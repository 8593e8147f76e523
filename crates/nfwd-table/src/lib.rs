//! # nfwd Table
//!
//! Forwarding tables for the nfwd forwarding core.
//!
//! All state is indexed by name in a single arena-backed [`NameTree`]. Each
//! node may carry a FIB entry, a strategy-choice record and any number of
//! PIT entries, so a FIB entry can reach the pending Interests under its
//! prefix without a second lookup structure.
//!
//! ## Core Components
//!
//! - [`NameTree`]: Arena of name nodes with longest-prefix match and
//!   bottom-up garbage collection
//! - [`fib::Entry`]: Next hops for one prefix, kept sorted by cost
//! - [`PitEntry`]: A pending Interest with its in- and out-records
//!
//! ## Redistribution
//!
//! Adding a next hop (or changing its cost) re-sends every unsatisfied
//! pending Interest in the entry's subtree through that hop:
//!
//! ```rust,ignore
//! use nfwd_core::{Interest, Name};
//! use nfwd_table::NameTree;
//!
//! let mut tree = NameTree::new();
//! tree.pit_insert(Interest::new(Name::from_uri("/a/x")?));
//!
//! let update = tree.add_or_update_next_hop(&Name::from_uri("/a")?, &face, 0, 10);
//! assert_eq!(update.redistributed, 1);
//! ```

pub mod fib;
pub mod name_tree;
pub mod pit;

pub use fib::{NextHop, NextHopChange, NextHopList, NextHopUpdate, send_pending_interests};
pub use name_tree::{NameTree, Node, NodeId, StrategyChoiceRecord};
pub use pit::{FaceRecord, PitEntry, PitEntryRef};
