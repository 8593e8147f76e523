//! Face (link) abstraction
//!
//! The [`Face`] trait is everything the forwarding core needs from a link:
//! an identity to compare against, the link type (so ad-hoc media can be
//! treated specially by loop avoidance), the scope used by the scope
//! predicate, and a non-blocking send.
//!
//! ## Implementations
//!
//! - [`MockFace`](crate::MockFace): In-memory face for testing (in this crate)

use std::fmt::{Debug, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::packet::Interest;

/// Identifies a sub-endpoint on a multi-access face (0 when unused)
pub type EndpointId = u64;

/// Unique identifier for a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u64);

impl Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of medium behind a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LinkType {
    /// A link to exactly one remote peer
    #[default]
    PointToPoint,
    /// A multicast group
    MultiAccess,
    /// A shared broadcast-like medium where a packet received on the face
    /// may legitimately be re-broadcast on it
    AdHoc,
}

/// Locality of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FaceScope {
    /// An application on this host
    Local,
    /// Anything reached over the network
    #[default]
    NonLocal,
}

/// An outgoing link
///
/// `send_interest` is a hand-off to the link's output queue: it never blocks
/// and the caller has no visibility into whether the send eventually
/// succeeds.
pub trait Face: Send + Sync + Debug {
    /// Face identity
    fn id(&self) -> FaceId;

    /// Kind of medium
    fn link_type(&self) -> LinkType;

    /// Locality
    fn scope(&self) -> FaceScope;

    /// Queue an Interest for transmission to `endpoint`
    fn send_interest(&self, interest: &Interest, endpoint: EndpointId);

    /// Check if this face is local to the host
    fn is_local(&self) -> bool {
        self.scope() == FaceScope::Local
    }
}

/// A face together with a sub-endpoint
#[derive(Debug, Clone)]
pub struct FaceEndpoint {
    /// The face
    pub face: Arc<dyn Face>,
    /// Sub-endpoint on the face
    pub endpoint: EndpointId,
}

impl FaceEndpoint {
    /// Create a face endpoint
    pub fn new(face: Arc<dyn Face>, endpoint: EndpointId) -> Self {
        Self { face, endpoint }
    }

    /// Identity of the underlying face
    pub fn face_id(&self) -> FaceId {
        self.face.id()
    }
}

impl PartialEq for FaceEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.face_id() == other.face_id() && self.endpoint == other.endpoint
    }
}

impl Eq for FaceEndpoint {}

impl Display for FaceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(face={},endpoint={})", self.face_id(), self.endpoint)
    }
}
