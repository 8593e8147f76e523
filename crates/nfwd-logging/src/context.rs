//! Forwarder context injection for multi-instance logging
//!
//! Several forwarders may share a process (tests and simulations routinely
//! run more than one). This module keeps the active forwarder's label and
//! instance id in thread-local storage so [`ForwarderContextLayer`] can tag
//! every span opened while a forwarder is handling an event.
//!
//! [`ForwarderContextLayer`]: crate::layers::ForwarderContextLayer

use std::cell::RefCell;

use uuid::Uuid;

/// Forwarder context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderContextData {
    /// Human-readable forwarder label
    pub label: String,
    /// Unique instance ID for this forwarder
    pub instance_id: Uuid,
}

impl ForwarderContextData {
    /// Create context data with a fresh instance ID
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_instance_id(label, Uuid::new_v4())
    }

    /// Create context data with a specific instance ID
    pub fn with_instance_id(label: impl Into<String>, instance_id: Uuid) -> Self {
        Self {
            label: label.into(),
            instance_id,
        }
    }
}

thread_local! {
    static FORWARDER_CONTEXT: RefCell<Option<ForwarderContextData>> = const { RefCell::new(None) };
}

/// RAII guard for forwarder context
///
/// When this guard is created, it sets the forwarder context for the current
/// thread. When it's dropped, it restores the previous context (if any).
///
/// # Example
///
/// ```ignore
/// use nfwd_logging::context::{ForwarderContextData, ForwarderContextGuard};
///
/// let _guard = ForwarderContextGuard::enter(ForwarderContextData::new("edge-1"));
///
/// // Spans in this scope carry forwarder = "edge-1"
/// tracing::debug!("Dispatching Interest");
/// ```
pub struct ForwarderContextGuard {
    previous: Option<ForwarderContextData>,
}

impl ForwarderContextGuard {
    /// Make `data` the current forwarder context
    pub fn enter(data: ForwarderContextData) -> Self {
        let previous = FORWARDER_CONTEXT.with(|ctx| ctx.borrow_mut().replace(data));
        Self { previous }
    }

    /// Enter a new context for `label` with a fresh instance ID
    pub fn new(label: impl Into<String>) -> Self {
        Self::enter(ForwarderContextData::new(label))
    }

    /// Get the current forwarder context (if any)
    pub fn current() -> Option<ForwarderContextData> {
        FORWARDER_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Get the current forwarder label (if set)
    pub fn current_label() -> Option<String> {
        Self::current().map(|ctx| ctx.label)
    }

    /// Get the current instance ID (if set)
    pub fn current_instance_id() -> Option<Uuid> {
        Self::current().map(|ctx| ctx.instance_id)
    }
}

impl Drop for ForwarderContextGuard {
    fn drop(&mut self) {
        FORWARDER_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}

/// Convenience macro to run a block inside a forwarder context
///
/// # Example
///
/// ```ignore
/// with_forwarder_context!("edge-1", {
///     tracing::info!("Adding route");
/// });
/// ```
#[macro_export]
macro_rules! with_forwarder_context {
    ($label:expr, $body:block) => {{
        let _guard = $crate::context::ForwarderContextGuard::new($label);
        $body
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarder_context_guard() {
        // No context initially
        assert!(ForwarderContextGuard::current().is_none());

        {
            let _guard = ForwarderContextGuard::new("edge");
            let ctx = ForwarderContextGuard::current().unwrap();
            assert_eq!(ctx.label, "edge");
        }

        // Context should be cleared after guard drops
        assert!(ForwarderContextGuard::current().is_none());
    }

    #[test]
    fn test_nested_contexts() {
        {
            let _guard_a = ForwarderContextGuard::new("a");
            assert_eq!(ForwarderContextGuard::current_label(), Some("a".to_string()));

            {
                let _guard_b = ForwarderContextGuard::new("b");
                assert_eq!(ForwarderContextGuard::current_label(), Some("b".to_string()));
            }

            // Should restore to a after b's guard drops
            assert_eq!(ForwarderContextGuard::current_label(), Some("a".to_string()));
        }

        assert!(ForwarderContextGuard::current_label().is_none());
    }

    #[test]
    fn test_with_instance_id() {
        let instance_id = Uuid::new_v4();
        let data = ForwarderContextData::with_instance_id("x", instance_id);

        let _guard = ForwarderContextGuard::enter(data.clone());
        assert_eq!(ForwarderContextGuard::current(), Some(data));
        assert_eq!(ForwarderContextGuard::current_instance_id(), Some(instance_id));
    }

    #[test]
    fn test_macro() {
        let label = with_forwarder_context!("macro", { ForwarderContextGuard::current_label() });
        assert_eq!(label, Some("macro".to_string()));
        assert!(ForwarderContextGuard::current().is_none());
    }
}
