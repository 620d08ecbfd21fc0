//! FTP command parsing and the result types handlers produce.

use crate::digest::DigestAlgorithm;

/// Commands understood by the control connection.
#[derive(Debug, PartialEq)]
pub enum Command {
    QUIT,
    LOGOUT,
    USER(String),
    PASS(String),
    PWD,
    CWD(String),
    CDUP,
    LIST(Option<String>),
    NLST(Option<String>),
    RETR(String),
    STOR(String),
    DELE(String),
    MKD(String),
    RMD(String),
    RNFR(String),
    RNTO(String),
    SIZE(String),
    TYPE(String),
    NOOP,
    SYST,
    FEAT,
    PASV,
    PORT(String),
    DIGEST(DigestAlgorithm, String),
    UNKNOWN,
}

impl Command {
    /// True for commands that move their payload over the data channel.
    pub fn uses_data_channel(&self) -> bool {
        matches!(
            self,
            Command::LIST(_) | Command::NLST(_) | Command::RETR(_) | Command::STOR(_)
        )
    }
}

#[derive(Debug)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        CommandResult {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn failure(reason: impl Into<String>, message: impl Into<String>) -> Self {
        CommandResult {
            status: CommandStatus::Failure(reason.into()),
            message: Some(message.into()),
        }
    }
}

/// Parse a raw command line into a [`Command`].
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    let optional_arg = || {
        if arg.is_empty() {
            None
        } else {
            Some(arg.to_string())
        }
    };

    match cmd.as_str() {
        "QUIT" => Command::QUIT,
        "LOGOUT" => Command::LOGOUT,
        "USER" => Command::USER(arg.to_string()),
        "PASS" => Command::PASS(arg.to_string()),
        "PWD" => Command::PWD,
        "CWD" => Command::CWD(arg.to_string()),
        "CDUP" => Command::CDUP,
        "LIST" => Command::LIST(optional_arg()),
        "NLST" => Command::NLST(optional_arg()),
        "RETR" => Command::RETR(arg.to_string()),
        "STOR" => Command::STOR(arg.to_string()),
        "DELE" => Command::DELE(arg.to_string()),
        "MKD" => Command::MKD(arg.to_string()),
        "RMD" => Command::RMD(arg.to_string()),
        "RNFR" => Command::RNFR(arg.to_string()),
        "RNTO" => Command::RNTO(arg.to_string()),
        "SIZE" => Command::SIZE(arg.to_string()),
        "TYPE" => Command::TYPE(arg.to_string()),
        "NOOP" => Command::NOOP,
        "SYST" => Command::SYST,
        "FEAT" => Command::FEAT,
        "PASV" => Command::PASV,
        "PORT" => Command::PORT(arg.to_string()),
        "SHA1" => Command::DIGEST(DigestAlgorithm::Sha1, arg.to_string()),
        "SHA256" => Command::DIGEST(DigestAlgorithm::Sha256, arg.to_string()),
        "SHA512" => Command::DIGEST(DigestAlgorithm::Sha512, arg.to_string()),
        _ => Command::UNKNOWN,
    }
}
