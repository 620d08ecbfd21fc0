//! DFS over FTP - Entry Point
//!
//! An FTP gateway serving a distributed filesystem backend, with per-user
//! virtual namespaces and POSIX-style permission checks.

use log::{error, info};
use std::process;

use dfs_over_ftp::Server;
use dfs_over_ftp::config::FtpConfig;

fn main() {
    // Log filtering comes from RUST_LOG
    env_logger::init();

    info!("Launching FTP server...");

    let config = match FtpConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Startup failed: {}", e);
            process::exit(1);
        }
    };

    server.start();
}
