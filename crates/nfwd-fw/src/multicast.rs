//! Multicast strategy
//!
//! Forwards every Interest to all next hops of the matching FIB entry,
//! except the face it arrived on (unless that face is ad hoc) and faces that
//! would cross a scope boundary. Nacks are ignored: on a shared medium one
//! member's Nack says nothing about the rest of the group.

use std::sync::Arc;

use nfwd_core::{FaceEndpoint, Interest, LinkType, Nack, Name};
use nfwd_table::{NextHop, PitEntryRef};
use tracing::{debug, trace};

use crate::error::StrategyError;
use crate::strategy::{Strategy, StrategyContext, make_instance_name, parse_instance_name};

/// Supported version
pub const MULTICAST_VERSION: u64 = 3;

/// Flood-to-all strategy
#[derive(Debug, Clone)]
pub struct MulticastStrategy {
    instance_name: Name,
}

impl MulticastStrategy {
    /// Versioned strategy name: `/localhost/nfd/strategy/multicast/%FD%03`
    pub fn strategy_name() -> Name {
        Self::base_name().append_version(MULTICAST_VERSION)
    }

    /// Strategy name without version
    pub fn base_name() -> Name {
        Name::new()
            .append("localhost")
            .append("nfd")
            .append("strategy")
            .append("multicast")
    }

    /// Create an instance from `instance_name`
    ///
    /// Fails if the name belongs to another strategy, carries parameters, or
    /// declares a version other than 3.
    pub fn new(instance_name: &Name) -> Result<Self, StrategyError> {
        let parsed = parse_instance_name(instance_name)?;
        let base = Self::base_name();

        if parsed.strategy_name != base {
            return Err(StrategyError::InvalidInstanceName(format!(
                "{} is not a multicast strategy name",
                instance_name
            )));
        }
        if !parsed.parameters.is_empty() {
            return Err(StrategyError::ParametersNotAccepted {
                strategy: base,
                parameters: parsed.parameters,
            });
        }
        if let Some(version) = parsed.version {
            if version != MULTICAST_VERSION {
                return Err(StrategyError::UnsupportedVersion {
                    strategy: base,
                    version,
                });
            }
        }

        Ok(Self {
            instance_name: make_instance_name(instance_name, &Self::strategy_name()),
        })
    }

    /// Registry factory
    pub fn create(instance_name: &Name) -> Result<Arc<dyn Strategy>, StrategyError> {
        Ok(Arc::new(Self::new(instance_name)?))
    }
}

impl Strategy for MulticastStrategy {
    fn instance_name(&self) -> &Name {
        &self.instance_name
    }

    fn after_receive_interest(
        &self,
        ctx: &mut dyn StrategyContext,
        ingress: &FaceEndpoint,
        interest: &Interest,
        pit_entry: PitEntryRef,
    ) {
        let next_hops: Vec<NextHop> = match ctx.lookup_fib(pit_entry) {
            Some(entry) => entry.next_hops().to_vec(),
            None => {
                debug!(name = %interest.name, "No FIB entry, Interest stays pending");
                return;
            }
        };

        for hop in &next_hops {
            if hop.face_id() == ingress.face_id() && ingress.face.link_type() != LinkType::AdHoc {
                trace!(face = %hop.face_id(), "Skipping ingress face");
                continue;
            }
            if ctx.would_violate_scope(ingress, interest, hop.face().as_ref()) {
                trace!(face = %hop.face_id(), "Skipping next hop, scope violation");
                continue;
            }

            // The hop's own endpoint, not endpoint 0: a multi-access face may
            // carry several routes for the same prefix
            let egress = FaceEndpoint::new(Arc::clone(hop.face()), hop.endpoint_id());
            debug!(name = %interest.name, egress = %egress, "Forwarding Interest");
            ctx.send_interest(pit_entry, &egress, interest);
        }
    }

    fn after_receive_nack(
        &self,
        _ctx: &mut dyn StrategyContext,
        _ingress: &FaceEndpoint,
        _nack: &Nack,
        _pit_entry: PitEntryRef,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGY_NAME: &str = "/localhost/nfd/strategy/multicast";

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_strategy_name() {
        assert_eq!(
            MulticastStrategy::strategy_name().to_uri(),
            "/localhost/nfd/strategy/multicast/%FD%03"
        );
    }

    #[test]
    fn test_unversioned_name_gets_version() {
        let strategy = MulticastStrategy::new(&name(STRATEGY_NAME)).unwrap();
        assert_eq!(strategy.instance_name(), &MulticastStrategy::strategy_name());
    }

    #[test]
    fn test_explicit_version_3() {
        let strategy = MulticastStrategy::new(&MulticastStrategy::strategy_name()).unwrap();
        assert_eq!(strategy.instance_name(), &MulticastStrategy::strategy_name());
    }

    #[test]
    fn test_other_version_rejected() {
        let err = MulticastStrategy::new(&name("/localhost/nfd/strategy/multicast/%FD%04"))
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::UnsupportedVersion {
                strategy: name(STRATEGY_NAME),
                version: 4
            }
        );
    }

    #[test]
    fn test_parameters_rejected() {
        let err = MulticastStrategy::new(&name("/localhost/nfd/strategy/multicast/%FD%03/p"))
            .unwrap_err();
        assert!(matches!(err, StrategyError::ParametersNotAccepted { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_foreign_name_rejected() {
        let err = MulticastStrategy::new(&name("/localhost/nfd/strategy/best-route/%FD%05"))
            .unwrap_err();
        assert!(matches!(err, StrategyError::InvalidInstanceName(_)));
    }
}
