//! Command handlers for the FTP control connection.
//!
//! This module defines handler functions for FTP commands, covering
//! authentication, navigation, file operations, checksum queries, and
//! data channel setup per client connection. All file semantics go
//! through [`DfsFileObject`], so every path is resolved inside the
//! requesting user's chroot and every access is permission-checked.

use crate::auth;
use crate::channel_registry::{ChannelEntry, ChannelRegistry};
use crate::client::Client;
use crate::command::{Command, CommandResult, CommandStatus};
use crate::data_channel::setup_data_stream;
use crate::digest::{self, DigestAlgorithm};
use crate::file_object::DfsFileObject;
use crate::file_transfer::{handle_file_download, handle_file_upload};
use crate::listing;
use crate::path;
use crate::system::StorageSystem;
use crate::user::UserRegistry;
use log::{error, info};

use std::net::{SocketAddr, TcpListener};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Routes a parsed FTP command to the matching handler.
///
/// # Arguments
///
/// * `client` - Session state of the issuing connection.
/// * `command` - The command to execute.
/// * `channel_registry` - Shared registry of per-client data channels.
/// * `system` - Shared storage context all file operations run against.
/// * `users` - Registry of configured accounts.
///
/// # Returns
///
/// * `CommandResult` - Status plus the reply line to send back.
pub fn handle_command(
    client: &mut Client,
    command: &Command,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    system: &Arc<StorageSystem>,
    users: &UserRegistry,
) -> CommandResult {
    match command {
        Command::QUIT => handle_cmd_quit(client),
        Command::LOGOUT => handle_cmd_logout(client),
        Command::USER(username) => handle_cmd_user(client, users, username),
        Command::PASS(password) => handle_cmd_pass(client, system, users, password),
        Command::PWD => handle_cmd_pwd(client),
        Command::CWD(target) => handle_cmd_cwd(client, system, target),
        Command::CDUP => handle_cmd_cwd(client, system, ".."),
        Command::LIST(target) => handle_cmd_list(client, channel_registry, system, target, true),
        Command::NLST(target) => handle_cmd_list(client, channel_registry, system, target, false),
        Command::RETR(filename) => handle_cmd_retr(client, channel_registry, system, filename),
        Command::STOR(filename) => handle_cmd_stor(client, channel_registry, system, filename),
        Command::DELE(filename) => handle_cmd_dele(client, system, filename),
        Command::MKD(target) => handle_cmd_mkd(client, system, target),
        Command::RMD(target) => handle_cmd_rmd(client, system, target),
        Command::RNFR(target) => handle_cmd_rnfr(client, system, target),
        Command::RNTO(target) => handle_cmd_rnto(client, system, target),
        Command::SIZE(filename) => handle_cmd_size(client, system, filename),
        Command::DIGEST(algorithm, filename) => {
            handle_cmd_digest(client, system, *algorithm, filename)
        }
        Command::TYPE(mode) => handle_cmd_type(mode),
        Command::NOOP => handle_cmd_noop(),
        Command::SYST => handle_cmd_syst(),
        Command::FEAT => handle_cmd_feat(),
        Command::PASV => handle_cmd_pasv(client, channel_registry),
        Command::PORT(addr) => handle_cmd_port(client, channel_registry, addr),
        Command::UNKNOWN => handle_cmd_unknown(),
    }
}

fn not_logged_in() -> CommandResult {
    CommandResult::failure("Not logged in", "530 Not logged in\r\n")
}

fn missing_argument() -> CommandResult {
    CommandResult::failure(
        "Missing argument",
        "501 Syntax error in parameters or arguments\r\n",
    )
}

/// Resolves a command argument against the session's working directory
/// and wraps it for the session user. `None` when no identity is bound.
fn resolve_object(
    client: &Client,
    system: &Arc<StorageSystem>,
    target: &str,
) -> Option<(String, DfsFileObject)> {
    let user = client.user()?;
    let resolved = path::resolve(client.cwd(), target);
    let object = DfsFileObject::new(&resolved, user, Arc::clone(system));
    Some((resolved, object))
}

/// QUIT ends the session and tells the control loop to close the stream.
fn handle_cmd_quit(client: &mut Client) -> CommandResult {
    client.logout();

    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some("221 Goodbye\r\n".into()),
    }
}

/// LOGOUT drops authentication but keeps the control connection open.
fn handle_cmd_logout(client: &mut Client) -> CommandResult {
    if client.is_logged_in() {
        client.logout();
        CommandResult::success("221 Logout successful\r\n")
    } else {
        CommandResult::failure("Not logged in", "530 User Not logged in\r\n")
    }
}

/// USER checks the account exists and records it for the PASS that follows.
fn handle_cmd_user(client: &mut Client, users: &UserRegistry, username: &str) -> CommandResult {
    match auth::validate_user(users, username) {
        Ok(response) => {
            client.set_user_valid(true);
            client.set_logged_in(false);
            client.set_username(Some(username.to_string()));
            CommandResult::success(response)
        }
        Err(e) => {
            client.set_user_valid(false);
            client.set_logged_in(false);
            client.set_username(None);
            CommandResult::failure(
                e.message(),
                format!("{} {}\r\n", e.ftp_response(), e.message()),
            )
        }
    }
}

/// Handles the PASS command: validates the password, binds the identity to
/// the session and makes sure the user's home directory exists.
fn handle_cmd_pass(
    client: &mut Client,
    system: &Arc<StorageSystem>,
    users: &UserRegistry,
    password: &str,
) -> CommandResult {
    if client.is_user_valid() {
        if let Some(username) = client.username().map(str::to_string) {
            match auth::validate_password(users, &username, password) {
                Ok(user) => {
                    // Home creation must succeed before the session is let in;
                    // every later path resolves beneath it.
                    if let Err(e) = system.ensure_home(&user) {
                        error!("failed to prepare home for {}: {}", user.name(), e);
                        return CommandResult::failure(
                            "Home directory unavailable",
                            "451 Home directory unavailable\r\n",
                        );
                    }
                    client.set_user(Some(user));
                    client.set_logged_in(true);
                    client.set_cwd("/".to_string());
                    return CommandResult::success("230 Login successful\r\n");
                }
                Err(e) => {
                    client.set_logged_in(false);
                    return CommandResult::failure(
                        e.message(),
                        format!("{} {}\r\n", e.ftp_response(), e.message()),
                    );
                }
            }
        }
    }
    // PASS without a preceding accepted USER
    CommandResult::failure(
        "Username not provided",
        "530 Please enter the username first\r\n",
    )
}

/// Handles the PWD command: reports the session's virtual working directory.
fn handle_cmd_pwd(client: &Client) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    CommandResult::success(format!("257 \"{}\"\r\n", client.cwd()))
}

/// Handles the CWD command: moves the session to another virtual directory.
fn handle_cmd_cwd(client: &mut Client, system: &Arc<StorageSystem>, target: &str) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if target.is_empty() {
        return missing_argument();
    }

    let Some((resolved, object)) = resolve_object(client, system, target) else {
        return not_logged_in();
    };

    if object.is_directory() {
        client.set_cwd(resolved);
        CommandResult::success("250 Directory changed successfully\r\n")
    } else {
        CommandResult::failure(
            "No such directory",
            "550 Failed to change directory\r\n",
        )
    }
}

/// Handles the MKD command: creates a directory at the resolved path.
fn handle_cmd_mkd(client: &Client, system: &Arc<StorageSystem>, target: &str) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if target.is_empty() {
        return missing_argument();
    }

    let Some((resolved, object)) = resolve_object(client, system, target) else {
        return not_logged_in();
    };

    if object.exists() {
        return CommandResult::failure("Already exists", "550 Path already exists\r\n");
    }

    if object.mkdir() {
        CommandResult::success(format!("257 \"{}\" created\r\n", resolved))
    } else {
        CommandResult::failure(
            "Directory not created",
            "550 Failed to create directory\r\n",
        )
    }
}

/// Handles the RMD command: removes a directory and its subtree.
fn handle_cmd_rmd(client: &Client, system: &Arc<StorageSystem>, target: &str) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if target.is_empty() {
        return missing_argument();
    }

    let Some((_, object)) = resolve_object(client, system, target) else {
        return not_logged_in();
    };

    if !object.is_directory() {
        return CommandResult::failure("Not a directory", "550 Not a directory\r\n");
    }

    if object.delete() {
        CommandResult::success("250 Directory removed\r\n")
    } else {
        CommandResult::failure(
            "Directory not removed",
            "550 Failed to remove directory\r\n",
        )
    }
}

/// Handles the DELE command: deletes a single file.
fn handle_cmd_dele(client: &Client, system: &Arc<StorageSystem>, filename: &str) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if filename.is_empty() {
        return missing_argument();
    }

    let Some((_, object)) = resolve_object(client, system, filename) else {
        return not_logged_in();
    };

    if !object.is_file() {
        return CommandResult::failure("File not found", "550 File not found\r\n");
    }

    if object.delete() {
        CommandResult::success("250 File deleted successfully\r\n")
    } else {
        CommandResult::failure("File not deleted", "550 Failed to delete file\r\n")
    }
}

/// Handles the RNFR command: records the rename source for the next RNTO.
fn handle_cmd_rnfr(
    client: &mut Client,
    system: &Arc<StorageSystem>,
    target: &str,
) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if target.is_empty() {
        return missing_argument();
    }

    let Some((resolved, object)) = resolve_object(client, system, target) else {
        return not_logged_in();
    };

    if !object.exists() {
        return CommandResult::failure("No such path", "550 File not found\r\n");
    }

    client.set_rename_from(Some(resolved));
    CommandResult::success("350 Ready for RNTO\r\n")
}

/// Handles the RNTO command: renames the previously recorded source.
fn handle_cmd_rnto(
    client: &mut Client,
    system: &Arc<StorageSystem>,
    target: &str,
) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if target.is_empty() {
        return missing_argument();
    }

    let Some(source) = client.take_rename_from() else {
        return CommandResult::failure(
            "RNFR not sent",
            "503 Bad sequence of commands\r\n",
        );
    };

    let Some((_, src_object)) = resolve_object(client, system, &source) else {
        return not_logged_in();
    };
    let Some((_, dst_object)) = resolve_object(client, system, target) else {
        return not_logged_in();
    };

    if src_object.move_to(&dst_object) {
        CommandResult::success("250 Rename successful\r\n")
    } else {
        CommandResult::failure("Rename failed", "553 Rename failed\r\n")
    }
}

/// Handles the SIZE command: reports a file's size in bytes.
fn handle_cmd_size(client: &Client, system: &Arc<StorageSystem>, filename: &str) -> CommandResult {
    if !client.is_logged_in() {
        return not_logged_in();
    }

    if filename.is_empty() {
        return missing_argument();
    }

    let Some((_, object)) = resolve_object(client, system, filename) else {
        return not_logged_in();
    };

    if object.is_file() {
        CommandResult::success(format!("213 {}\r\n", object.size()))
    } else {
        CommandResult::failure("File not found", "550 File not found\r\n")
    }
}

/// Handles the checksum commands: hashes files server-side and replies
/// with their hex digests.
///
/// The argument is a comma separated list of paths. All of them must name
/// readable files; a single bad entry fails the whole command and no
/// partial reply is sent.
fn handle_cmd_digest(
    client: &Client,
    system: &Arc<StorageSystem>,
    algorithm: DigestAlgorithm,
    argument: &str,
) -> CommandResult {
    // 1. Must be logged in
    if !client.is_logged_in() {
        return not_logged_in();
    }

    // 2. Argument presence check
    if argument.trim().is_empty() {
        return CommandResult::failure(
            "Missing argument",
            "504 Command not implemented for that parameter\r\n",
        );
    }

    let mut reply = String::new();
    for (i, raw_name) in argument.split(',').enumerate() {
        let filename = raw_name.trim();

        // 3. Each entry must resolve to an existing file
        let Some((resolved, object)) = resolve_object(client, system, filename) else {
            return not_logged_in();
        };

        if !object.is_file() {
            return CommandResult::failure(
                "Not a file",
                "504 Command not implemented for that parameter\r\n",
            );
        }

        // 4. Hash the content through the same stream path RETR uses
        let mut input = match object.create_input_stream(0) {
            Ok(stream) => stream,
            Err(e) => {
                error!("digest denied for {}: {}", resolved, e);
                return CommandResult::failure("Cannot read file", "550 Permission denied\r\n");
            }
        };

        let hash = match digest::compute(algorithm, input.as_mut()) {
            Ok(hash) => hash,
            Err(e) => {
                error!("digest failed for {}: {}", resolved, e);
                return CommandResult::failure(
                    "Digest failed",
                    "451 Requested action aborted: local error\r\n",
                );
            }
        };

        if i > 0 {
            reply.push_str(", ");
        }
        // Names with spaces are quoted so the reply stays parseable
        if filename.contains(' ') {
            reply.push('"');
            reply.push_str(filename);
            reply.push('"');
        } else {
            reply.push_str(filename);
        }
        reply.push(' ');
        reply.push_str(&hash);
        info!("{} digest computed for {}", algorithm.name(), resolved);
    }

    CommandResult::success(format!("251 {}\r\n", reply))
}

/// Handles the TYPE command: image and ASCII modes are accepted, all
/// transfers move raw bytes either way.
fn handle_cmd_type(mode: &str) -> CommandResult {
    match mode.to_ascii_uppercase().as_str() {
        "I" => CommandResult::success("200 Type set to I\r\n"),
        "A" => CommandResult::success("200 Type set to A\r\n"),
        other => CommandResult::failure(
            format!("Unsupported type {}", other),
            "504 Command not implemented for that parameter\r\n",
        ),
    }
}

/// Handles the NOOP command.
fn handle_cmd_noop() -> CommandResult {
    CommandResult::success("200 NOOP command successful\r\n")
}

/// Handles the SYST command.
fn handle_cmd_syst() -> CommandResult {
    CommandResult::success("215 UNIX Type: L8\r\n")
}

/// Handles the FEAT command: advertises the extension commands.
fn handle_cmd_feat() -> CommandResult {
    CommandResult::success("211-Features:\r\n SIZE\r\n SHA1\r\n SHA256\r\n SHA512\r\n211 End\r\n")
}

/// PASV binds a listener from the configured range and announces it.
///
/// Binds a listener on the next free data socket, records it in the
/// registry, and returns the PASV response with socket info to the client.
fn handle_cmd_pasv(
    client: &mut Client,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
) -> CommandResult {
    // Login required before any data channel setup
    if !client.is_logged_in() {
        return not_logged_in();
    }

    let client_addr = match client.client_addr() {
        Some(addr) => *addr,
        None => {
            return CommandResult::failure(
                "Client address unknown",
                "500 Internal server error\r\n",
            );
        }
    };

    let mut registry = channel_registry.lock().unwrap();

    // One pending data channel per client
    if registry.contains(&client_addr) {
        return CommandResult::failure(
            "Data channel already initialized",
            "425 Data connection already initialized\r\n",
        );
    }

    // Pick the first free port in the passive range
    if let Some(data_socket) = registry.next_available_socket() {
        match TcpListener::bind(data_socket) {
            Ok(listener) => {
                // Non-blocking so the accept poll can back off later
                if let Err(e) = listener.set_nonblocking(true) {
                    error!("failed to set non-blocking mode: {}", e);
                    return CommandResult::failure(
                        "Failed to configure listener",
                        "425 Can't open data connection\r\n",
                    );
                }

                let mut entry = ChannelEntry::default();
                entry.set_data_socket(Some(data_socket));
                entry.set_listener(Some(listener));

                registry.insert(client_addr, entry);
                client.set_data_channel_init(true);

                info!(
                    "client {} bound to data socket {} in PASV mode",
                    client_addr, data_socket
                );

                CommandResult::success(format!("227 Entering Passive Mode ({})\r\n", data_socket))
            }
            Err(e) => {
                error!("failed to bind to {}: {}", data_socket, e);
                CommandResult::failure(
                    "Port binding failed",
                    "425 Can't open data connection\r\n",
                )
            }
        }
    } else {
        // No ports available in the configured range
        CommandResult::failure("No available port", "425 Can't open data connection\r\n")
    }
}

/// PORT records the client's announced address for an active-mode connect.
///
/// Parses the client-provided address and records it as the dial-out
/// target for the next transfer.
fn handle_cmd_port(
    client: &mut Client,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    addr: &str,
) -> CommandResult {
    // Login required before any data channel setup
    if !client.is_logged_in() {
        return not_logged_in();
    }

    let client_addr = match client.client_addr() {
        Some(addr) => *addr,
        None => {
            return CommandResult::failure(
                "Client address unknown",
                "500 Internal server error\r\n",
            );
        }
    };

    // Argument arrives as IP:PORT
    let parsed_addr = match SocketAddr::from_str(addr) {
        Ok(addr) => addr,
        Err(_) => {
            return CommandResult::failure(
                "Invalid address format",
                "501 Invalid address format. Use IP:PORT\r\n",
            );
        }
    };

    // Validate IP matches the control connection
    if parsed_addr.ip() != client_addr.ip() {
        return CommandResult::failure(
            "IP mismatch",
            "501 IP address in PORT must match control connection\r\n",
        );
    }

    // Privileged ports are never a valid data target
    if parsed_addr.port() < 1024 {
        return CommandResult::failure(
            "Port out of range",
            "501 Port must be between 1024 and 65535\r\n",
        );
    }

    let mut registry = channel_registry.lock().unwrap();

    // One pending data channel per client
    if registry.contains(&client_addr) {
        return CommandResult::failure(
            "Data channel already initialized",
            "425 Data connection already initialized\r\n",
        );
    }

    let mut entry = ChannelEntry::default();
    entry.set_data_socket(Some(parsed_addr));

    registry.insert(client_addr, entry);
    client.set_data_channel_init(true);

    info!(
        "client {} announced data socket {} in PORT mode",
        client_addr, parsed_addr
    );

    CommandResult::success("200 PORT command successful\r\n")
}

/// Handles LIST and NLST: sends the directory content over the data
/// channel, long rows for LIST and bare names for NLST.
fn handle_cmd_list(
    client: &mut Client,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    system: &Arc<StorageSystem>,
    target: &Option<String>,
    long_format: bool,
) -> CommandResult {
    // 1. Must be logged in
    if !client.is_logged_in() {
        return not_logged_in();
    }

    // 2. A data channel must be staged
    if !client.is_data_channel_init() {
        return CommandResult::failure(
            "Data channel not initialized",
            "530 Data channel not initialized\r\n",
        );
    }

    // 3. Resolve the target directory, defaulting to the working directory
    let Some((resolved, object)) = resolve_object(client, system, target.as_deref().unwrap_or(""))
    else {
        return not_logged_in();
    };

    // 4. A denied or failed listing never yields partial content
    let Some(children) = object.list_files() else {
        info!("listing refused for {}", resolved);
        return CommandResult::failure("Listing denied", "550 Failed to list directory\r\n");
    };

    let rows: Vec<String> = if long_format {
        children.iter().map(listing::format_list_entry).collect()
    } else {
        children.iter().map(listing::format_name_entry).collect()
    };

    // 5. Retrieve client address for the channel lookup
    let client_addr = match client.client_addr() {
        Some(addr) => *addr,
        None => {
            return CommandResult::failure(
                "Client address unknown",
                "500 Internal server error\r\n",
            );
        }
    };

    // 6. Establish the data connection and push the rows
    let mut data_stream = match setup_data_stream(channel_registry, &client_addr) {
        Some(stream) => stream,
        None => {
            error!("failed to establish data connection for client {}", client_addr);
            client.set_data_channel_init(false);
            return CommandResult::failure(
                "Data connection failed",
                "425 Can't open data connection\r\n",
            );
        }
    };

    client.set_data_channel_init(false);

    match listing::send_listing(&mut data_stream, &rows) {
        Ok(()) => CommandResult::success("226 Directory listing successful\r\n"),
        Err(e) => {
            error!("failed to send listing to client {}: {}", client_addr, e);
            CommandResult::failure(
                "Listing transfer failed",
                "426 Connection closed; transfer aborted\r\n",
            )
        }
    }
}

/// Handles the RETR command: downloads a file from the backend to the client.
fn handle_cmd_retr(
    client: &mut Client,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    system: &Arc<StorageSystem>,
    filename: &str,
) -> CommandResult {
    // 1. Must be logged in
    if !client.is_logged_in() {
        return not_logged_in();
    }

    // 2. A data channel must be staged
    if !client.is_data_channel_init() {
        return CommandResult::failure(
            "Data channel not initialized",
            "530 Data channel not initialized\r\n",
        );
    }

    // 3. A filename is required
    if filename.is_empty() {
        return missing_argument();
    }

    // 4. Resolve and check the source file
    let Some((resolved, object)) = resolve_object(client, system, filename) else {
        return not_logged_in();
    };

    if !object.is_file() {
        return CommandResult::failure("File not found", "550 File not found\r\n");
    }

    // 5. Retrieve client address
    let client_addr = match client.client_addr() {
        Some(addr) => *addr,
        None => {
            return CommandResult::failure(
                "Client address unknown",
                "500 Internal server error\r\n",
            );
        }
    };

    info!("client {} requested to retrieve {}", client_addr, resolved);

    // 6. Setup data stream for file download
    let data_stream = match setup_data_stream(channel_registry, &client_addr) {
        Some(stream) => stream,
        None => {
            error!("failed to establish data connection for client {}", client_addr);
            client.set_data_channel_init(false);
            return CommandResult::failure(
                "Data connection failed",
                "425 Can't open data connection\r\n",
            );
        }
    };

    client.set_data_channel_init(false);

    // 7. Delegate file download to file transfer module
    match handle_file_download(data_stream, &object) {
        Ok((status, msg)) => CommandResult {
            status,
            message: Some(msg.into()),
        },
        Err((status, msg)) => CommandResult {
            status,
            message: Some(msg.into()),
        },
    }
}

/// Handles the STOR command: uploads a file from the client into the backend.
fn handle_cmd_stor(
    client: &mut Client,
    channel_registry: &Arc<Mutex<ChannelRegistry>>,
    system: &Arc<StorageSystem>,
    filename: &str,
) -> CommandResult {
    // 1. Must be logged in
    if !client.is_logged_in() {
        return not_logged_in();
    }

    // 2. A data channel must be staged
    if !client.is_data_channel_init() {
        return CommandResult::failure(
            "Data channel not initialized",
            "530 Data channel not initialized\r\n",
        );
    }

    // 3. A filename is required
    if filename.is_empty() {
        return missing_argument();
    }

    // 4. Resolve the destination inside the user's namespace
    let Some((resolved, object)) = resolve_object(client, system, filename) else {
        return not_logged_in();
    };

    // Uploads may not target an existing directory
    if object.is_directory() {
        return CommandResult::failure("Is a directory", "553 Target is a directory\r\n");
    }

    // 5. Retrieve client address for logging
    let client_addr = match client.client_addr() {
        Some(addr) => *addr,
        None => {
            return CommandResult::failure(
                "Client address unknown",
                "500 Internal server error\r\n",
            );
        }
    };

    info!("client {} requested to store {}", client_addr, resolved);

    // 6. Setup data stream for file upload
    let data_stream = match setup_data_stream(channel_registry, &client_addr) {
        Some(stream) => stream,
        None => {
            error!("failed to establish data connection for client {}", client_addr);
            client.set_data_channel_init(false);
            return CommandResult::failure(
                "Data connection failed",
                "425 Can't open data connection\r\n",
            );
        }
    };

    client.set_data_channel_init(false);

    // 7. Delegate file upload to file transfer module
    match handle_file_upload(data_stream, &object) {
        Ok((status, msg)) => CommandResult {
            status,
            message: Some(msg.into()),
        },
        Err((status, msg)) => CommandResult {
            status,
            message: Some(msg.into()),
        },
    }
}

/// Anything the parser did not recognize.
fn handle_cmd_unknown() -> CommandResult {
    CommandResult::failure(
        "Unknown command",
        "500 Syntax error, command unrecognized\r\n",
    )
}
