//! Interest and Nack values
//!
//! These are in-memory representations only; wire encoding belongs to the
//! link layer.

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::name::Name;

/// Default Interest lifetime
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// A request for named content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    /// Requested name
    pub name: Name,
    /// Whether Data under `name` (not only exactly `name`) satisfies this Interest
    pub can_be_prefix: bool,
    /// Whether cached Data must be fresh
    pub must_be_fresh: bool,
    /// Nonce for loop detection
    pub nonce: u32,
    /// How long the Interest stays pending
    pub lifetime: Duration,
    /// Remaining hops, if limited
    pub hop_limit: Option<u8>,
}

impl Interest {
    /// Create an Interest for `name` with default parameters
    pub fn new(name: Name) -> Self {
        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            nonce: 0,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            hop_limit: None,
        }
    }

    /// Set CanBePrefix
    pub fn with_can_be_prefix(mut self, can_be_prefix: bool) -> Self {
        self.can_be_prefix = can_be_prefix;
        self
    }

    /// Set MustBeFresh
    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the lifetime
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Check if Data named `data_name` satisfies this Interest
    pub fn matches_data(&self, data_name: &Name) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(data_name)
        } else {
            self.name == *data_name
        }
    }
}

impl Display for Interest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        let mut sep = '?';
        if self.can_be_prefix {
            write!(f, "{}CanBePrefix", sep)?;
            sep = '&';
        }
        if self.must_be_fresh {
            write!(f, "{}MustBeFresh", sep)?;
            sep = '&';
        }
        write!(f, "{}Nonce={:08x}", sep, self.nonce)
    }
}

/// Reason carried by a negative acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NackReason {
    /// Unspecified
    #[default]
    None,
    /// Upstream is congested
    Congestion,
    /// Upstream detected a duplicate nonce
    Duplicate,
    /// Upstream has no route
    NoRoute,
}

impl Display for NackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NackReason::None => write!(f, "None"),
            NackReason::Congestion => write!(f, "Congestion"),
            NackReason::Duplicate => write!(f, "Duplicate"),
            NackReason::NoRoute => write!(f, "NoRoute"),
        }
    }
}

/// Negative acknowledgement of an Interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nack {
    /// The Interest being rejected
    pub interest: Interest,
    /// Why it was rejected
    pub reason: NackReason,
}

impl Nack {
    /// Create a Nack for `interest`
    pub fn new(interest: Interest, reason: NackReason) -> Self {
        Self { interest, reason }
    }
}

impl Display for Nack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~{}", self.interest, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_interest_defaults() {
        let interest = Interest::new(name("/a/b"));
        assert!(!interest.can_be_prefix);
        assert!(!interest.must_be_fresh);
        assert_eq!(interest.lifetime, DEFAULT_INTEREST_LIFETIME);
        assert!(interest.hop_limit.is_none());
    }

    #[test]
    fn test_exact_match() {
        let interest = Interest::new(name("/a/b"));
        assert!(interest.matches_data(&name("/a/b")));
        assert!(!interest.matches_data(&name("/a/b/c")));
    }

    #[test]
    fn test_prefix_match() {
        let interest = Interest::new(name("/a/b")).with_can_be_prefix(true);
        assert!(interest.matches_data(&name("/a/b")));
        assert!(interest.matches_data(&name("/a/b/c")));
        assert!(!interest.matches_data(&name("/a/c")));
    }

    #[test]
    fn test_display() {
        let interest = Interest::new(name("/a"))
            .with_can_be_prefix(true)
            .with_nonce(0x1234);
        assert_eq!(interest.to_string(), "/a?CanBePrefix&Nonce=00001234");

        let nack = Nack::new(Interest::new(name("/a")), NackReason::NoRoute);
        assert!(nack.to_string().ends_with("~NoRoute"));
    }
}
