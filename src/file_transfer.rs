//! File upload and download over data connections.
//!
//! Moves bytes between TCP data streams and adapter file streams in fixed
//! 1024-byte chunks, retrying transient socket errors and reporting
//! FTP-compliant status codes and messages.

use crate::command::CommandStatus;
use crate::error::StorageError;
use crate::file_object::DfsFileObject;
use log::{error, warn};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

const MAX_RETRIES: usize = 3;

type TransferOutcome = Result<(CommandStatus, &'static str), (CommandStatus, &'static str)>;

fn failure(msg: &'static str) -> (CommandStatus, &'static str) {
    (CommandStatus::Failure(msg.into()), msg)
}

/// Maps a stream-creation error to the reply the client gets.
fn open_failure(e: &StorageError) -> (CommandStatus, &'static str) {
    match e {
        StorageError::PermissionDenied(_) => failure("550 Permission denied\r\n"),
        StorageError::NotFound(_) => failure("550 File not found\r\n"),
        _ => failure("451 Requested action aborted: local error\r\n"),
    }
}

/// Handles uploading a file from the client into the backend.
pub fn handle_file_upload(mut data_stream: TcpStream, file: &DfsFileObject) -> TransferOutcome {
    let mut out = match file.create_output_stream(0) {
        Ok(stream) => stream,
        Err(e) => {
            error!("cannot open {} for writing: {}", file.absolute_path(), e);
            return Err(open_failure(&e));
        }
    };

    let mut buffer = [0; 1024];
    loop {
        let mut retries = 0;
        let n = loop {
            match data_stream.read(&mut buffer) {
                Ok(0) => break 0,
                Ok(n) => break n,
                Err(e) if retries < MAX_RETRIES => {
                    warn!("transient read error: {}, retrying", e);
                    retries += 1;
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    error!("read failure on data stream: {}", e);
                    return Err(failure("426 Connection closed; transfer aborted\r\n"));
                }
            }
        };
        if n == 0 {
            break;
        }

        if let Err(e) = out.write_all(&buffer[..n]) {
            error!("failed to write {}: {}", file.absolute_path(), e);
            return Err(failure("550 Requested action not taken\r\n"));
        }
    }

    if out.flush().is_ok() {
        Ok((CommandStatus::Success, "226 Transfer complete\r\n"))
    } else {
        Err(failure("450 Requested file action not taken\r\n"))
    }
}

/// Handles downloading a file from the backend to the client.
pub fn handle_file_download(mut data_stream: TcpStream, file: &DfsFileObject) -> TransferOutcome {
    let mut input = match file.create_input_stream(0) {
        Ok(stream) => stream,
        Err(e) => {
            error!("cannot open {} for reading: {}", file.absolute_path(), e);
            return Err(open_failure(&e));
        }
    };

    let mut buffer = [0; 1024];
    loop {
        let n = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!("read error on {}: {}", file.absolute_path(), e);
                return Err(failure("451 Requested action aborted\r\n"));
            }
        };

        let mut retries = 0;
        loop {
            match data_stream.write_all(&buffer[..n]) {
                Ok(_) => break,
                Err(e) if retries < MAX_RETRIES => {
                    warn!("transient write error: {}, retrying", e);
                    retries += 1;
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    error!("write failure to data stream: {}", e);
                    return Err(failure("426 Connection closed; transfer aborted\r\n"));
                }
            }
        }
    }

    if data_stream.flush().is_ok() {
        Ok((CommandStatus::Success, "226 Transfer complete\r\n"))
    } else {
        Err(failure("450 Requested file action not taken\r\n"))
    }
}
