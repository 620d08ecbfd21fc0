//! Establishing data connections for transfers.
//!
//! Turns the registered channel state for a client into a live TCP
//! stream: accepting on the passive listener, or dialing the address the
//! client announced. Each prepared channel is consumed by exactly one
//! transfer.

use log::{error, info, warn};
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::channel_registry::ChannelRegistry;

const MAX_ATTEMPTS: u32 = 10;
const INITIAL_SLEEP_MS: u64 = 100;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces the data stream for a client's prepared channel.
///
/// The client's registry entry is removed up front, under a short lock;
/// the slow part (waiting for the peer) runs without holding the registry.
///
/// # Arguments
///
/// * `channel_registry` - Shared registry of per-client data channels.
/// * `client_addr` - Control-connection address of the client.
///
/// # Returns
///
/// * `Some(TcpStream)` - Established data connection ready for I/O.
/// * `None` - No channel was prepared, or the peer never showed up.
pub fn setup_data_stream(
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    client_addr: &SocketAddr,
) -> Option<TcpStream> {
    let entry = {
        let mut registry = channel_registry.lock().unwrap();
        registry.remove(client_addr)
    };

    let Some(mut entry) = entry else {
        error!("no data channel prepared for client {}", client_addr);
        return None;
    };

    if let Some(listener) = entry.take_listener() {
        accept_passive(listener, client_addr)
    } else if let Some(target) = entry.take_data_socket() {
        connect_active(target, client_addr)
    } else {
        error!("empty data channel entry for client {}", client_addr);
        None
    }
}

/// Passive mode: poll the bound listener for the client's connection,
/// backing off exponentially until it arrives or the attempts run out.
fn accept_passive(listener: TcpListener, client_addr: &SocketAddr) -> Option<TcpStream> {
    if let Err(e) = listener.set_nonblocking(true) {
        error!("failed to set data listener to non-blocking mode: {}", e);
        return None;
    }

    let mut attempt = 0;
    let mut delay = INITIAL_SLEEP_MS;

    while attempt < MAX_ATTEMPTS {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!(
                    "data connection accepted from {} for client {}",
                    addr, client_addr
                );
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!("failed to set data stream to blocking mode: {}", e);
                }
                return Some(stream);
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(delay));
                delay *= 2;
                attempt += 1;
            }
            Err(e) => {
                error!("fatal error accepting data connection: {}", e);
                return None;
            }
        }
    }

    error!(
        "timeout waiting for data connection from {} after {} attempts",
        client_addr, attempt
    );
    None
}

/// Active mode: dial the address the client announced with PORT.
fn connect_active(target: SocketAddr, client_addr: &SocketAddr) -> Option<TcpStream> {
    match TcpStream::connect_timeout(&target, CONNECT_TIMEOUT) {
        Ok(stream) => {
            info!(
                "data connection opened to {} for client {}",
                target, client_addr
            );
            Some(stream)
        }
        Err(e) => {
            error!(
                "failed to open data connection to {} for client {}: {}",
                target, client_addr, e
            );
            None
        }
    }
}
