//! Server bootstrap.
//!
//! Binds the control listener, builds the shared storage context, and
//! spawns one handler thread per accepted connection. The backend is not
//! contacted here; the first session to need it triggers the connection.

use log::{error, info};
use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::channel_registry::ChannelRegistry;
use crate::client_handler::handle_client;
use crate::config::FtpConfig;
use crate::error::{StorageError, StorageResult};
use crate::system::StorageSystem;
use crate::user::UserRegistry;

pub struct Server {
    config: FtpConfig,
    system: Arc<StorageSystem>,
    users: Arc<UserRegistry>,
    channel_registry: Arc<Mutex<ChannelRegistry>>,
    listener: TcpListener,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Builds the server from validated configuration and binds the
    /// control listener. Fails with `Configuration` when the config has
    /// no plain listener or an unusable host, with `Io` when the bind
    /// itself is refused.
    pub fn new(config: FtpConfig) -> StorageResult<Server> {
        let control_socket = config
            .control_socket()
            .ok_or_else(|| StorageError::configuration("no plain control port configured"))?;
        let listener = TcpListener::bind(&control_socket)?;

        let host: IpAddr = config
            .host
            .parse()
            .map_err(|_| StorageError::configuration(format!("bad listen host {}", config.host)))?;
        let channel_registry = Arc::new(Mutex::new(ChannelRegistry::new(
            host,
            config.data_port_range(),
        )));

        let system = Arc::new(StorageSystem::from_uri(
            &config.backend_uri,
            &config.superuser,
            &config.supergroup,
            config.permissions,
        )?);
        let users = Arc::new(config.user_registry());

        Ok(Server {
            config,
            system,
            users,
            channel_registry,
            listener,
        })
    }

    /// Address the control listener actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one handler thread per client.
    pub fn start(&self) {
        if let Some(ssl_port) = self.config.ssl_port {
            // TLS is terminated in front of this process; the port is
            // only echoed so operators see the whole surface in one log.
            info!(
                "TLS control connections expected on port {} via the fronting proxy",
                ssl_port
            );
        }
        info!(
            "FTP server listening on {} over {}",
            self.listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".to_string()),
            self.config.backend_uri
        );

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = match stream.peer_addr() {
                        Ok(peer) => peer,
                        Err(e) => {
                            error!("Could not resolve peer address: {}", e);
                            continue;
                        }
                    };
                    info!("New connection: {}", peer);

                    let system = Arc::clone(&self.system);
                    let users = Arc::clone(&self.users);
                    let channel_registry = Arc::clone(&self.channel_registry);
                    thread::spawn(move || {
                        handle_client(stream, peer, system, users, channel_registry);
                    });
                }
                Err(e) => error!("Error accepting connection: {}", e),
            }
        }
    }
}
