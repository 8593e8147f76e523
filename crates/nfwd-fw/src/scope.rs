//! Scope control for reserved name prefixes
//!
//! - `/localhost` Interests never leave the host: they may only go to local
//!   faces.
//! - `/localhop` Interests travel at most one hop: one that arrived on a
//!   non-local face may only go to local faces.

use nfwd_core::{Face, Interest, Name};

const LOCALHOST: &[u8] = b"localhost";
const LOCALHOP: &[u8] = b"localhop";

fn starts_with(name: &Name, component: &[u8]) -> bool {
    name.get(0).is_some_and(|c| c.as_bytes() == component)
}

/// Check if `name` is under `/localhost`
pub fn is_localhost(name: &Name) -> bool {
    starts_with(name, LOCALHOST)
}

/// Check if `name` is under `/localhop`
pub fn is_localhop(name: &Name) -> bool {
    starts_with(name, LOCALHOP)
}

/// Check if forwarding `interest` from `ingress` out `egress` violates scope
pub fn would_violate_scope(ingress: &dyn Face, interest: &Interest, egress: &dyn Face) -> bool {
    if egress.is_local() {
        return false;
    }
    if is_localhost(&interest.name) {
        return true;
    }
    if is_localhop(&interest.name) {
        return !ingress.is_local();
    }
    false
}
