//! # nfwd Core
//!
//! Core types for the nfwd named-data forwarding core.
//!
//! This crate provides the values and abstractions the forwarding tables and
//! strategies are written against, so that the same forwarding logic can be
//! driven by real links or by in-memory faces in tests.
//!
//! ## Key Types
//!
//! - [`Name`] / [`NameComponent`]: Hierarchical names with NDN URI syntax and
//!   `%FD` version components
//! - [`Face`]: Abstraction over an outgoing link (identity, link type, scope,
//!   non-blocking send)
//! - [`FaceEndpoint`]: A face together with a sub-endpoint id
//! - [`Interest`] / [`Nack`]: The two message kinds the core reacts to
//! - [`MockFace`]: In-memory face that queues sent Interests for inspection

pub mod error;
pub mod face;
pub mod mock_face;
pub mod name;
pub mod packet;

// Re-export main types
pub use error::*;
pub use face::*;
pub use mock_face::*;
pub use name::*;
pub use packet::*;
