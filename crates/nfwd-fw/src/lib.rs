//! # nfwd Forwarding
//!
//! Strategies, strategy selection, and the forwarding pipeline for nfwd.
//!
//! ## Features
//!
//! - **Pluggable strategies**: A [`Strategy`] sees each Interest and Nack for
//!   the names it is responsible for and decides where copies go, through
//!   the narrow [`StrategyContext`] interface.
//!
//! - **Instance names**: Strategies are chosen by versioned, optionally
//!   parameterized names such as `/localhost/nfd/strategy/multicast/%FD%03`,
//!   resolved through the process-wide [`StrategyRegistry`].
//!
//! - **Per-prefix selection**: [`StrategyChoice`] maps prefixes to strategy
//!   instances; the longest matching prefix wins and the root always has one.
//!
//! - **Scope enforcement**: `/localhost` and `/localhop` Interests never
//!   leave the host or travel past one hop.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nfwd_core::{FaceEndpoint, FaceId, Interest, MockFace, Name};
//! use nfwd_fw::Forwarder;
//!
//! let mut fw = Forwarder::new()?;
//! let consumer = Arc::new(MockFace::new(1));
//! let producer = Arc::new(MockFace::new(2));
//! fw.add_face(consumer.clone())?;
//! fw.add_face(producer.clone())?;
//!
//! fw.add_route(&Name::from_uri("/example")?, FaceId(2), 0, 10)?;
//! fw.on_incoming_interest(
//!     &FaceEndpoint::new(consumer, 0),
//!     Interest::new(Name::from_uri("/example/data")?),
//! );
//! assert_eq!(producer.take_sent().len(), 1);
//! ```
//!
//! ## Architecture
//!
//! - [`strategy`]: The `Strategy` trait and instance-name parsing
//! - [`multicast`]: The built-in multicast strategy
//! - [`registry`]: Strategy factories by name
//! - [`strategy_choice`]: Prefix to strategy table
//! - [`scope`]: `/localhost` and `/localhop` rules
//! - [`face_table`]: Registered faces
//! - [`forwarder`]: The pipelines tying it together
//! - [`config`]: Forwarder configuration
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod face_table;
pub mod forwarder;
pub mod multicast;
pub mod registry;
pub mod scope;
pub mod strategy;
pub mod strategy_choice;

// Re-export main types
pub use config::ForwarderConfig;
pub use error::{FwError, FwResult, StrategyError};
pub use face_table::FaceTable;
pub use forwarder::Forwarder;
pub use multicast::{MULTICAST_VERSION, MulticastStrategy};
pub use registry::{StrategyFactory, StrategyRegistry};
pub use strategy::{
    ParsedInstanceName, Strategy, StrategyContext, make_instance_name, parse_instance_name,
};
pub use strategy_choice::StrategyChoice;
