//! Process-wide ident registry.
//!
//! When a [`ConnectionInstance`][super::ConnectionInstance] opens its TCP connection, it
//! registers its local port against the username it will offer in `USER`, so an in-process
//! identd (or a helper that shells out to one) can answer truthfully for concurrent outbound
//! connections sharing one IP.

use std::collections::HashMap;
use std::sync::Mutex;

/// Maps a local TCP port to the username owning that connection.
///
/// Shared across every [`crate::bridge::BridgedClient`] in the process; cheap to clone since
/// the table itself lives behind an `Arc`-free `Mutex` and callers are expected to hold one
/// instance behind their own `Arc`.
#[derive(Debug, Default)]
pub struct IdentRegistry {
    ports: Mutex<HashMap<u16, String>>,
}

impl IdentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `username` as owning `local_port`, replacing any previous entry.
    pub fn register(&self, local_port: u16, username: impl Into<String>) {
        self.ports.lock().unwrap().insert(local_port, username.into());
    }

    /// Removes the entry for `local_port`, if present.
    ///
    /// Must be called once a connection using that port is torn down, or the registry will
    /// answer ident lookups for a port that has since been reused by an unrelated connection.
    pub fn unregister(&self, local_port: u16) {
        self.ports.lock().unwrap().remove(&local_port);
    }

    /// Looks up the username registered for `local_port`.
    pub fn lookup(&self, local_port: u16) -> Option<String> {
        self.ports.lock().unwrap().get(&local_port).cloned()
    }

    /// Number of ports currently registered.
    pub fn len(&self) -> usize {
        self.ports.lock().unwrap().len()
    }

    /// Returns `true` if no ports are currently registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup() {
        let reg = IdentRegistry::new();
        reg.register(6667, "alice");
        assert_eq!(reg.lookup(6667).as_deref(), Some("alice"));
    }

    #[test]
    fn unregister_clears_entry() {
        let reg = IdentRegistry::new();
        reg.register(6667, "alice");
        reg.unregister(6667);
        assert_eq!(reg.lookup(6667), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn reregistering_a_port_overwrites() {
        let reg = IdentRegistry::new();
        reg.register(6667, "alice");
        reg.register(6667, "bob");
        assert_eq!(reg.lookup(6667).as_deref(), Some("bob"));
        assert_eq!(reg.len(), 1);
    }
}
