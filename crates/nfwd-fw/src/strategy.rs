//! Forwarding strategy abstraction
//!
//! A [`Strategy`] decides, for each incoming Interest, which next hops of
//! the longest-prefix-match FIB entry receive a copy. Strategies never touch
//! the tables directly; everything they need from the pipeline goes through
//! [`StrategyContext`].
//!
//! ## Instance names
//!
//! Strategies are selected by instance name:
//!
//! ```text
//! /localhost/nfd/strategy/<strategy-name>/%FD<version>[/<parameters>...]
//! ```
//!
//! The last version component splits the name into the strategy name, the
//! version, and any parameters that follow it.

use std::fmt::Debug;

use nfwd_core::{Face, FaceEndpoint, Interest, Nack, Name};
use nfwd_table::PitEntryRef;
use nfwd_table::fib;

use crate::error::StrategyError;

/// Pipeline services available to a strategy
pub trait StrategyContext {
    /// FIB entry matching the PIT entry's name by longest-prefix match
    fn lookup_fib(&self, pit_entry: PitEntryRef) -> Option<&fib::Entry>;

    /// Check if forwarding `interest` from `ingress` out `egress` crosses a
    /// scope boundary
    fn would_violate_scope(
        &self,
        ingress: &FaceEndpoint,
        interest: &Interest,
        egress: &dyn Face,
    ) -> bool;

    /// Forward `interest` to `egress`, recording it on the PIT entry
    fn send_interest(&mut self, pit_entry: PitEntryRef, egress: &FaceEndpoint, interest: &Interest);
}

/// A forwarding strategy
pub trait Strategy: Send + Sync + Debug {
    /// Fully-qualified instance name, including the version
    fn instance_name(&self) -> &Name;

    /// Handle an Interest that created or refreshed `pit_entry`
    fn after_receive_interest(
        &self,
        ctx: &mut dyn StrategyContext,
        ingress: &FaceEndpoint,
        interest: &Interest,
        pit_entry: PitEntryRef,
    );

    /// Handle a Nack for the Interest of `pit_entry`
    fn after_receive_nack(
        &self,
        ctx: &mut dyn StrategyContext,
        ingress: &FaceEndpoint,
        nack: &Nack,
        pit_entry: PitEntryRef,
    );
}

/// An instance name split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstanceName {
    /// Strategy name, without version
    pub strategy_name: Name,
    /// Declared version, if any
    pub version: Option<u64>,
    /// Components after the version
    pub parameters: Name,
}

/// Split an instance name at its last version component
///
/// A name with no version component is all strategy name.
pub fn parse_instance_name(input: &Name) -> Result<ParsedInstanceName, StrategyError> {
    let Some(i) = input.components().iter().rposition(|c| c.is_version()) else {
        return Ok(ParsedInstanceName {
            strategy_name: input.clone(),
            version: None,
            parameters: Name::new(),
        });
    };

    let version = input.components()[i]
        .to_version()
        .map_err(|e| StrategyError::InvalidInstanceName(format!("{}: {}", input, e)))?;

    Ok(ParsedInstanceName {
        strategy_name: input.get_prefix(i),
        version: Some(version),
        parameters: input.get_sub_name(i + 1),
    })
}

/// Complete `input` with the version of `strategy_name` when it has none
///
/// `strategy_name` is a strategy's versioned name, such as
/// `/localhost/nfd/strategy/multicast/%FD%03`.
pub fn make_instance_name(input: &Name, strategy_name: &Name) -> Name {
    let has_version = input.components().iter().any(|c| c.is_version());
    match strategy_name.last() {
        Some(version) if !has_version && version.is_version() => {
            input.clone().append(version.clone())
        }
        _ => input.clone(),
    }
}
