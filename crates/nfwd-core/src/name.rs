//! Hierarchical names
//!
//! A [`Name`] is an ordered sequence of opaque [`NameComponent`]s. Names are
//! written in NDN URI form (`/localhost/nfd/strategy/multicast/%FD%03`):
//! bytes outside the unreserved set are percent-encoded, and a component made
//! only of periods is written with three extra periods.
//!
//! Version components follow the marker convention: the byte `0xFD` followed
//! by a big-endian non-negative integer of 1, 2, 4 or 8 bytes.

use std::fmt::{self, Display, Write};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NameError;

/// Marker byte that starts a version component
pub const VERSION_MARKER: u8 = 0xFD;

/// A single name component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameComponent(Vec<u8>);

impl NameComponent {
    /// Create a component from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Create a version component
    pub fn from_version(version: u64) -> Self {
        let mut bytes = vec![VERSION_MARKER];
        if version <= u8::MAX as u64 {
            bytes.push(version as u8);
        } else if version <= u16::MAX as u64 {
            bytes.extend_from_slice(&(version as u16).to_be_bytes());
        } else if version <= u32::MAX as u64 {
            bytes.extend_from_slice(&(version as u32).to_be_bytes());
        } else {
            bytes.extend_from_slice(&version.to_be_bytes());
        }
        Self(bytes)
    }

    /// Parse a component from its URI (percent-escaped) form
    pub fn from_escaped(escaped: &str) -> Result<Self, NameError> {
        if !escaped.is_empty() && escaped.bytes().all(|b| b == b'.') {
            if escaped.len() < 3 {
                return Err(NameError::InvalidEscape(escaped.to_string()));
            }
            return Ok(Self(vec![b'.'; escaped.len() - 3]));
        }

        let raw = escaped.as_bytes();
        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'%' {
                let hex = raw
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| NameError::InvalidEscape(escaped.to_string()))?;
                bytes.push(hex);
                i += 3;
            } else {
                bytes.push(raw[i]);
                i += 1;
            }
        }
        Ok(Self(bytes))
    }

    /// Get the raw component bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check if this is a well-formed version component
    pub fn is_version(&self) -> bool {
        self.to_version().is_ok()
    }

    /// Decode the version number carried by this component
    pub fn to_version(&self) -> Result<u64, NameError> {
        match self.0.split_first() {
            Some((&VERSION_MARKER, value)) => match value.len() {
                1 | 2 | 4 | 8 => Ok(value.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)),
                len => Err(NameError::InvalidVersionLength(len)),
            },
            _ => Err(NameError::NotVersion),
        }
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

impl Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| *b == b'.') {
            // "..." stands for the empty component
            for _ in 0..self.0.len() + 3 {
                f.write_char('.')?;
            }
            return Ok(());
        }
        for &b in &self.0 {
            if is_unreserved(b) {
                f.write_char(b as char)?;
            } else {
                write!(f, "%{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl From<&str> for NameComponent {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// A hierarchical name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    /// Create the empty (root) name
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a name from NDN URI form
    ///
    /// An optional `ndn:` scheme is accepted. Empty segments (for example a
    /// trailing slash) are ignored, so `""`, `"/"` and `"ndn:/"` all parse to
    /// the root name.
    pub fn from_uri(uri: &str) -> Result<Self, NameError> {
        let trimmed = uri.trim();
        let path = trimmed.strip_prefix("ndn:").unwrap_or(trimmed);
        if path.contains(char::is_whitespace) {
            return Err(NameError::InvalidUri(uri.to_string()));
        }

        let components = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(NameComponent::from_escaped)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    /// Append a component, returning the extended name
    pub fn append(mut self, component: impl Into<NameComponent>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Append a version component, returning the extended name
    pub fn append_version(self, version: u64) -> Self {
        self.append(NameComponent::from_version(version))
    }

    /// Push a component in place
    pub fn push(&mut self, component: impl Into<NameComponent>) {
        self.components.push(component.into());
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if this is the root name
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the component at `index`
    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    /// Get the last component
    pub fn last(&self) -> Option<&NameComponent> {
        self.components.last()
    }

    /// All components in order
    pub fn components(&self) -> &[NameComponent] {
        &self.components
    }

    /// The first `len` components (the whole name if `len` exceeds it)
    pub fn get_prefix(&self, len: usize) -> Name {
        Name {
            components: self.components[..len.min(self.components.len())].to_vec(),
        }
    }

    /// The components from `start` onwards
    pub fn get_sub_name(&self, start: usize) -> Name {
        Name {
            components: self.components[start.min(self.components.len())..].to_vec(),
        }
    }

    /// Check if this name is a prefix of (or equal to) `other`
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// Render the name in NDN URI form
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_char('/');
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        Name::from_uri(&uri).map_err(serde::de::Error::custom)
    }
}
