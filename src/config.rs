//! Server configuration.
//!
//! Loaded once at startup from `config.toml` with `DFS_FTP_*` environment
//! overrides layered on top. Every value the storage layer depends on is
//! validated here so a bad deployment dies at boot instead of at the first
//! transfer.

use std::collections::HashMap;
use std::ops::Range;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::backend;
use crate::user::{UserEntry, UserRegistry};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Complete server configuration.
///
/// `backend_uri`, `superuser` and `supergroup` are mandatory; loading fails
/// when any of them is absent. At least one of `port` / `ssl_port` must be
/// set, each with a matching passive port range.
#[derive(Debug, Deserialize, Clone)]
pub struct FtpConfig {
    /// IP address the control listeners bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the plain control connection.
    pub port: Option<u16>,

    /// Port range for PASV data connections, as `"min-max"`.
    pub passive_ports: Option<String>,

    /// Port for the TLS control connection, terminated by a fronting
    /// proxy; this process serves plain FTP only.
    pub ssl_port: Option<u16>,

    /// Passive range reserved for the TLS side.
    pub ssl_passive_ports: Option<String>,

    /// Backend URI, e.g. `mem:///data/ftp`; its path component is the
    /// root directory all user homes live under.
    pub backend_uri: String,

    /// Identity the backend connection authenticates as.
    pub superuser: String,
    pub supergroup: String,

    /// Whether permission triads are enforced. Off by default: every
    /// check passes and the root is opened up at first connect.
    #[serde(default)]
    pub permissions: bool,

    /// Accounts allowed to log in, keyed by username.
    #[serde(default)]
    pub users: HashMap<String, UserEntry>,
}

impl FtpConfig {
    /// Load configuration from `config.toml` in the working directory,
    /// with `DFS_FTP_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load from a specific file (extension resolved by the config
    /// crate), then apply environment overrides and validate.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("DFS_FTP"))
            .build()?;
        let config: FtpConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.is_none() && self.ssl_port.is_none() {
            return Err(ConfigError::Message(
                "at least one of port / ssl_port must be set".into(),
            ));
        }

        if self.port.is_some() {
            match &self.passive_ports {
                Some(range) => {
                    parse_port_range(range)?;
                }
                None => {
                    return Err(ConfigError::Message(
                        "passive_ports is required when port is set".into(),
                    ));
                }
            }
        }

        if self.ssl_port.is_some() {
            match &self.ssl_passive_ports {
                Some(range) => {
                    parse_port_range(range)?;
                }
                None => {
                    return Err(ConfigError::Message(
                        "ssl_passive_ports is required when ssl_port is set".into(),
                    ));
                }
            }
        }

        if self.backend_uri.is_empty() {
            return Err(ConfigError::Message("backend_uri cannot be empty".into()));
        }

        let root = backend::root_of_uri(&self.backend_uri)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        if root == "/" {
            return Err(ConfigError::Message(
                "backend_uri must carry a root directory below \"/\"".into(),
            ));
        }

        if self.superuser.is_empty() || self.supergroup.is_empty() {
            return Err(ConfigError::Message(
                "superuser and supergroup cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Bind address for the plain control listener.
    pub fn control_socket(&self) -> Option<String> {
        self.port.map(|port| format!("{}:{}", self.host, port))
    }

    /// Parsed PASV port range for the plain listener.
    pub fn data_port_range(&self) -> Range<u16> {
        self.passive_ports
            .as_deref()
            .and_then(|r| parse_port_range(r).ok())
            .unwrap_or(0..0)
    }

    /// Accounts as a registry the session layer authenticates against.
    pub fn user_registry(&self) -> UserRegistry {
        UserRegistry::new(self.users.clone())
    }
}

/// Parses a `"min-max"` port range, requiring `min < max`.
pub fn parse_port_range(spec: &str) -> Result<Range<u16>, ConfigError> {
    let (min, max) = spec
        .split_once('-')
        .ok_or_else(|| ConfigError::Message(format!("bad port range \"{}\", use min-max", spec)))?;
    let min: u16 = min
        .trim()
        .parse()
        .map_err(|_| ConfigError::Message(format!("bad port range start \"{}\"", min)))?;
    let max: u16 = max
        .trim()
        .parse()
        .map_err(|_| ConfigError::Message(format!("bad port range end \"{}\"", max)))?;
    if min >= max {
        return Err(ConfigError::Message(format!(
            "port range start {} must be below end {}",
            min, max
        )));
    }
    Ok(min..max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<FtpConfig, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        let config: FtpConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    const GOOD: &str = r#"
        port = 2121
        passive_ports = "2122-2222"
        backend_uri = "mem:///data/ftp"
        superuser = "hdfs"
        supergroup = "supergroup"

        [users.alice]
        password = "secret"
        groups = ["staff"]
    "#;

    #[test]
    fn full_config_parses() {
        let config = parse(GOOD).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.control_socket().as_deref(), Some("0.0.0.0:2121"));
        assert_eq!(config.data_port_range(), 2122..2222);
        assert!(!config.permissions);
        assert!(config.user_registry().contains("alice"));
    }

    #[test]
    fn missing_backend_uri_is_fatal() {
        let toml = r#"
            port = 2121
            passive_ports = "2122-2222"
            superuser = "hdfs"
            supergroup = "supergroup"
        "#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn listener_requires_passive_range() {
        let toml = r#"
            port = 2121
            backend_uri = "mem:///data/ftp"
            superuser = "hdfs"
            supergroup = "supergroup"
        "#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn ssl_listener_requires_its_own_range() {
        let toml = r#"
            ssl_port = 2990
            backend_uri = "mem:///data/ftp"
            superuser = "hdfs"
            supergroup = "supergroup"
        "#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn some_listener_must_be_configured() {
        let toml = r#"
            backend_uri = "mem:///data/ftp"
            superuser = "hdfs"
            supergroup = "supergroup"
        "#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn backend_root_must_sit_below_slash() {
        let toml = r#"
            port = 2121
            passive_ports = "2122-2222"
            backend_uri = "mem:///"
            superuser = "hdfs"
            supergroup = "supergroup"
        "#;
        assert!(parse(toml).is_err());
    }

    #[test]
    fn port_range_spec_is_checked() {
        assert_eq!(parse_port_range("2122-2222").unwrap(), 2122..2222);
        assert!(parse_port_range("2222-2122").is_err());
        assert!(parse_port_range("2122").is_err());
        assert!(parse_port_range("a-b").is_err());
    }
}
