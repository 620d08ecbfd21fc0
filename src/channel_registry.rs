//! Registry of per-client data channels.
//!
//! Maps each control connection to the state of its data channel: a bound
//! listener waiting for the client (PASV) or the client-announced address
//! to dial out to (PORT). Shared across session threads behind a mutex;
//! lock it briefly, never across a transfer.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::ops::Range;

/// Data channel state for one client.
///
/// In passive mode both fields are set (the socket records what was
/// announced in the 227 reply); in active mode only `data_socket` is,
/// holding the address the server will connect to.
#[derive(Default)]
pub struct ChannelEntry {
    data_socket: Option<SocketAddr>,
    listener: Option<TcpListener>,
}

impl ChannelEntry {
    /// The announced or requested data address, when one is staged.
    pub fn data_socket(&self) -> Option<&SocketAddr> {
        self.data_socket.as_ref()
    }

    /// Returns a reference to the passive mode listener if present.
    pub fn listener(&self) -> Option<&TcpListener> {
        self.listener.as_ref()
    }

    /// Replaces the staged data address.
    pub fn set_data_socket(&mut self, socket: Option<SocketAddr>) {
        self.data_socket = socket;
    }

    /// Sets the passive mode listener, replacing any existing value.
    pub fn set_listener(&mut self, listener: Option<TcpListener>) {
        self.listener = listener;
    }

    /// Takes ownership of the data socket out of the entry.
    pub fn take_data_socket(&mut self) -> Option<SocketAddr> {
        self.data_socket.take()
    }

    /// Takes ownership of the listener out of the entry.
    pub fn take_listener(&mut self) -> Option<TcpListener> {
        self.listener.take()
    }
}

/// Maps client control addresses to their data channels and hands out
/// passive ports from the configured range.
pub struct ChannelRegistry {
    registry: HashMap<SocketAddr, ChannelEntry>,
    host: IpAddr,
    data_ports: Range<u16>,
}

impl ChannelRegistry {
    /// Creates an empty registry allocating passive sockets on `host`
    /// within `data_ports`.
    pub fn new(host: IpAddr, data_ports: Range<u16>) -> Self {
        Self {
            registry: HashMap::new(),
            host,
            data_ports,
        }
    }

    /// Inserts or replaces the entry for the given client address.
    pub fn insert(&mut self, addr: SocketAddr, entry: ChannelEntry) {
        self.registry.insert(addr, entry);
    }

    /// Removes and returns the entry for a client address, if any.
    pub fn remove(&mut self, addr: &SocketAddr) -> Option<ChannelEntry> {
        self.registry.remove(addr)
    }

    /// Returns a mutable reference to the entry for a client address.
    pub fn get_mut(&mut self, addr: &SocketAddr) -> Option<&mut ChannelEntry> {
        self.registry.get_mut(addr)
    }

    /// Checks whether an entry exists for the given client address.
    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.registry.contains_key(addr)
    }

    /// Next socket in the passive range not currently assigned to any
    /// client, or `None` when the range is exhausted.
    pub fn next_available_socket(&self) -> Option<SocketAddr> {
        for port in self.data_ports.clone() {
            let candidate = SocketAddr::new(self.host, port);
            let in_use = self
                .registry
                .values()
                .any(|entry| entry.data_socket == Some(candidate));
            if !in_use {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ChannelRegistry {
        ChannelRegistry::new("127.0.0.1".parse().unwrap(), 40000..40003)
    }

    fn control_addr(port: u16) -> SocketAddr {
        SocketAddr::new("127.0.0.1".parse().unwrap(), port)
    }

    #[test]
    fn allocates_sockets_from_configured_range() {
        let reg = registry();
        let socket = reg.next_available_socket().unwrap();
        assert_eq!(socket.port(), 40000);
        assert_eq!(socket.ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn skips_sockets_already_assigned() {
        let mut reg = registry();
        let first = reg.next_available_socket().unwrap();
        let mut entry = ChannelEntry::default();
        entry.set_data_socket(Some(first));
        reg.insert(control_addr(5000), entry);

        let second = reg.next_available_socket().unwrap();
        assert_eq!(second.port(), 40001);
    }

    #[test]
    fn exhausted_range_yields_none() {
        let mut reg = registry();
        for i in 0..3 {
            let socket = reg.next_available_socket().unwrap();
            let mut entry = ChannelEntry::default();
            entry.set_data_socket(Some(socket));
            reg.insert(control_addr(5000 + i), entry);
        }
        assert!(reg.next_available_socket().is_none());
    }

    #[test]
    fn entries_come_back_out() {
        let mut reg = registry();
        let addr = control_addr(5000);
        let mut entry = ChannelEntry::default();
        entry.set_data_socket(Some(control_addr(40000)));
        reg.insert(addr, entry);

        assert!(reg.contains(&addr));
        let removed = reg.remove(&addr).unwrap();
        assert_eq!(removed.data_socket().unwrap().port(), 40000);
        assert!(!reg.contains(&addr));
    }
}
