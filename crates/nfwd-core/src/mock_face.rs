//! Mock face implementation for testing
//!
//! Provides an in-memory face for exercising forwarding tables and
//! strategies without real links. Every Interest handed to the face is
//! queued on an unbounded channel, mirroring the non-blocking hand-off a
//! real link's output queue provides, and can be drained for inspection.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nfwd_core::{Face, Interest, MockFace, Name};
//!
//! let face = Arc::new(MockFace::new(1));
//! face.send_interest(&Interest::new(Name::from_uri("/a")?), 0);
//!
//! let sent = face.take_sent();
//! assert_eq!(sent.len(), 1);
//! ```

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::face::{EndpointId, Face, FaceId, FaceScope, LinkType};
use crate::name::Name;
use crate::packet::Interest;

/// An Interest handed to a mock face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInterest {
    /// The Interest
    pub interest: Interest,
    /// The endpoint it was addressed to
    pub endpoint: EndpointId,
}

/// A mock face for testing
///
/// Sent Interests are delivered into an in-memory output queue.
#[derive(Debug)]
pub struct MockFace {
    /// Face identity
    id: FaceId,
    /// Kind of medium
    link_type: LinkType,
    /// Locality
    scope: FaceScope,
    /// Output queue sender
    outgoing_tx: mpsc::UnboundedSender<SentInterest>,
    /// Output queue receiver
    outgoing_rx: Mutex<mpsc::UnboundedReceiver<SentInterest>>,
}

impl MockFace {
    /// Create a point-to-point, non-local mock face
    pub fn new(id: u64) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        Self {
            id: FaceId(id),
            link_type: LinkType::PointToPoint,
            scope: FaceScope::NonLocal,
            outgoing_tx,
            outgoing_rx: Mutex::new(outgoing_rx),
        }
    }

    /// Set the link type
    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = link_type;
        self
    }

    /// Set the scope
    pub fn with_scope(mut self, scope: FaceScope) -> Self {
        self.scope = scope;
        self
    }

    /// Drain every Interest queued so far
    pub fn take_sent(&self) -> Vec<SentInterest> {
        let mut rx = self.outgoing_rx.lock();
        let mut sent = Vec::new();
        while let Ok(item) = rx.try_recv() {
            sent.push(item);
        }
        sent
    }

    /// Drain the queue, keeping only the Interest names
    pub fn take_sent_names(&self) -> Vec<Name> {
        self.take_sent()
            .into_iter()
            .map(|sent| sent.interest.name)
            .collect()
    }
}

impl Face for MockFace {
    fn id(&self) -> FaceId {
        self.id
    }

    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn scope(&self) -> FaceScope {
        self.scope
    }

    fn send_interest(&self, interest: &Interest, endpoint: EndpointId) {
        trace!(face = %self.id, endpoint, name = %interest.name, "Queueing Interest");
        let item = SentInterest {
            interest: interest.clone(),
            endpoint,
        };
        if self.outgoing_tx.send(item).is_err() {
            warn!(face = %self.id, "Output queue closed, dropping Interest");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interest(uri: &str) -> Interest {
        Interest::new(Name::from_uri(uri).unwrap())
    }

    #[test]
    fn test_send_and_take() {
        let face = MockFace::new(1);
        face.send_interest(&interest("/a"), 0);
        face.send_interest(&interest("/b"), 5);

        let sent = face.take_sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].interest.name.to_string(), "/a");
        assert_eq!(sent[1].endpoint, 5);

        // Queue is drained
        assert!(face.take_sent().is_empty());
    }

    #[test]
    fn test_take_sent_names() {
        let face = MockFace::new(1);
        face.send_interest(&interest("/x/y"), 0);
        assert_eq!(face.take_sent_names(), vec![Name::from_uri("/x/y").unwrap()]);
    }

    #[test]
    fn test_builders() {
        let face = MockFace::new(9)
            .with_link_type(LinkType::AdHoc)
            .with_scope(FaceScope::Local);
        assert_eq!(face.id(), FaceId(9));
        assert_eq!(face.link_type(), LinkType::AdHoc);
        assert_eq!(face.scope(), FaceScope::Local);
    }
}
