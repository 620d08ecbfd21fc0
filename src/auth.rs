//! Authentication against the configured account registry.
//!
//! Two-step FTP login: USER proposes a name, PASS proves it. Both steps
//! yield either a ready-made positive reply or an [`AuthError`] the
//! handlers format into a negative one.

use log::{info, warn};

use crate::user::{DfsUser, UserRegistry};

/// Login failure, carrying the FTP reply code and text for the client.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    UnknownUser,
    InvalidPassword,
    NoUsername,
}

impl AuthError {
    /// FTP reply code for this failure.
    pub fn ftp_response(&self) -> &'static str {
        "530"
    }

    /// Human-readable reply text.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::UnknownUser => "Invalid username",
            AuthError::InvalidPassword => "Invalid password",
            AuthError::NoUsername => "Please enter the username first",
        }
    }
}

/// Validates the USER step: the name must be a configured account.
pub fn validate_user(registry: &UserRegistry, username: &str) -> Result<&'static str, AuthError> {
    if registry.contains(username) {
        Ok("331 Password required\r\n")
    } else {
        warn!("login attempt for unknown user {}", username);
        Err(AuthError::UnknownUser)
    }
}

/// Validates the PASS step and yields the authenticated identity.
pub fn validate_password(
    registry: &UserRegistry,
    username: &str,
    password: &str,
) -> Result<DfsUser, AuthError> {
    match registry.authenticate(username, password) {
        Some(user) => {
            info!("user {} logged in", user.name());
            Ok(user)
        }
        None => {
            warn!("failed login for user {}", username);
            Err(AuthError::InvalidPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserEntry;
    use std::collections::HashMap;

    fn registry() -> UserRegistry {
        let mut entries = HashMap::new();
        entries.insert(
            "alice".to_string(),
            UserEntry {
                password: "secret".to_string(),
                groups: vec!["staff".to_string()],
            },
        );
        UserRegistry::new(entries)
    }

    #[test]
    fn known_user_proceeds_to_password() {
        assert!(validate_user(&registry(), "alice").is_ok());
        assert_eq!(
            validate_user(&registry(), "mallory"),
            Err(AuthError::UnknownUser)
        );
    }

    #[test]
    fn password_step_yields_identity() {
        let user = validate_password(&registry(), "alice", "secret").unwrap();
        assert_eq!(user.name(), "alice");
        assert_eq!(user.main_group(), "staff");
        assert_eq!(
            validate_password(&registry(), "alice", "nope"),
            Err(AuthError::InvalidPassword)
        );
    }

    #[test]
    fn error_replies_carry_530() {
        assert_eq!(AuthError::UnknownUser.ftp_response(), "530");
        assert_eq!(AuthError::NoUsername.message(), "Please enter the username first");
    }
}
