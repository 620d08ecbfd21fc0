//! Per-connection control loop.
//!
//! Reads commands from the control stream, dispatches them, and sends the
//! replies back. Each connection owns its own [`Client`] state; the only
//! state shared between connections is the storage context and the data
//! channel registry.

use log::{error, info};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};

use crate::channel_registry::ChannelRegistry;
use crate::client::Client;
use crate::command::{CommandStatus, parse_command};
use crate::handlers::handle_command;
use crate::system::StorageSystem;
use crate::user::UserRegistry;

/// Runs one control connection from greeting to disconnect.
///
/// Bytes are buffered until a full `\r\n`-terminated line arrives, the line
/// is parsed and dispatched through `handle_command`, and the reply goes back
/// out on the same stream. Whatever data channel entry the session staged is
/// released when the loop ends.
///
/// # Arguments
///
/// * `cmd_stream` - Control connection to the client.
/// * `client_addr` - Peer address, also the key into the channel registry.
/// * `system` - Shared storage context for all file operations.
/// * `users` - Registry of configured accounts.
/// * `channel_registry` - Shared registry for data channel listeners and targets.
pub fn handle_client(
    mut cmd_stream: TcpStream,
    client_addr: SocketAddr,
    system: Arc<StorageSystem>,
    users: Arc<UserRegistry>,
    channel_registry: Arc<Mutex<ChannelRegistry>>,
) {
    // Service-ready greeting before the first command
    if let Err(e) = cmd_stream.write_all(b"220 Welcome to the DFS over FTP server\r\n") {
        error!("Failed to send welcome: {}", e);
        return;
    }

    // Session state lives with this thread; no other connection touches it
    let mut client = Client::default();
    client.set_client_addr(Some(client_addr));

    let mut buffer = [0; 1024]; // Read chunk for the control stream
    let mut command_buffer = String::new(); // Accumulates bytes until a full command arrives

    loop {
        match cmd_stream.read(&mut buffer) {
            Ok(0) => {
                // Orderly shutdown from the client side
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(n) => {
                // Control traffic is line-oriented text
                command_buffer.push_str(&String::from_utf8_lossy(&buffer[..n]));

                if command_buffer.ends_with("\r\n") {
                    let command = parse_command(&command_buffer);
                    info!("Received from {}: {:?}", client_addr, &command);

                    command_buffer.clear();

                    // Transfer commands get their preliminary reply before the
                    // data connection is established
                    if command.uses_data_channel()
                        && client.is_logged_in()
                        && client.is_data_channel_init()
                    {
                        let _ = cmd_stream.write_all(b"150 Opening data connection\r\n");
                        let _ = cmd_stream.flush();
                    }

                    let result =
                        handle_command(&mut client, &command, &channel_registry, &system, &users);

                    if let CommandStatus::CloseConnection = result.status {
                        // QUIT: flush the goodbye before dropping the stream
                        if let Some(msg) = result.message.as_ref() {
                            let _ = cmd_stream.write_all(msg.as_bytes());
                        }
                        info!("Client {} requested to quit", client_addr);
                        let _ = cmd_stream.shutdown(std::net::Shutdown::Both);
                        break;
                    }

                    if let Some(message) = result.message {
                        let _ = cmd_stream.write_all(message.as_bytes());
                    }
                }
            }
            Err(e) => {
                // Hard disconnect or network fault
                error!("Failed to read from stream: {}", e);
                break;
            }
        }
    }

    // Release any data channel entry left behind on disconnect
    {
        let mut registry = channel_registry.lock().unwrap();
        registry.remove(&client_addr);
    }
    info!("Client {} disconnected", client_addr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, StorageBackend};
    use crate::user::UserEntry;
    use std::collections::HashMap;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn spawn_session() -> TcpStream {
        let backend = Arc::new(MemoryBackend::new("hdfs", "supergroup"));
        let system = Arc::new(
            StorageSystem::with_connector(
                Box::new(move || Ok(Arc::clone(&backend) as Arc<dyn StorageBackend>)),
                "/data/ftp",
                "hdfs",
                "supergroup",
                true,
            )
            .unwrap(),
        );
        let mut entries = HashMap::new();
        entries.insert(
            "alice".to_string(),
            UserEntry {
                password: "secret".to_string(),
                groups: vec!["staff".to_string()],
            },
        );
        let users = Arc::new(UserRegistry::new(entries));
        let registry = Arc::new(Mutex::new(ChannelRegistry::new(
            "127.0.0.1".parse().unwrap(),
            47851..47900,
        )));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, peer) = listener.accept().unwrap();
            handle_client(stream, peer, system, users, registry);
        });

        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
    }

    fn read_reply(stream: &mut TcpStream) -> String {
        let mut buffer = [0; 1024];
        let n = stream.read(&mut buffer).unwrap();
        String::from_utf8_lossy(&buffer[..n]).to_string()
    }

    #[test]
    fn greets_and_quits() {
        let mut stream = spawn_session();
        assert!(read_reply(&mut stream).starts_with("220 "));

        stream.write_all(b"QUIT\r\n").unwrap();
        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert!(rest.contains("221 Goodbye"));
    }

    #[test]
    fn login_flow_over_the_wire() {
        let mut stream = spawn_session();
        read_reply(&mut stream);

        stream.write_all(b"USER alice\r\n").unwrap();
        assert!(read_reply(&mut stream).starts_with("331 "));

        stream.write_all(b"PASS secret\r\n").unwrap();
        assert!(read_reply(&mut stream).starts_with("230 "));

        stream.write_all(b"PWD\r\n").unwrap();
        assert_eq!(read_reply(&mut stream), "257 \"/\"\r\n");
    }

    #[test]
    fn partial_commands_are_buffered() {
        let mut stream = spawn_session();
        read_reply(&mut stream);

        stream.write_all(b"USER al").unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        stream.write_all(b"ice\r\n").unwrap();
        assert!(read_reply(&mut stream).starts_with("331 "));
    }
}
