//! Per-session client state.
//!
//! One `Client` lives on each control-connection thread. It tracks the
//! two-step login, the authenticated identity, the session's working
//! directory in the virtual namespace, the pending rename source and
//! whether a data channel has been prepared.

use std::net::SocketAddr;

use crate::user::DfsUser;

pub struct Client {
    is_user_valid: bool,
    is_logged_in: bool,
    username: Option<String>,
    user: Option<DfsUser>,
    cwd: String,
    rename_from: Option<String>,
    is_data_channel_init: bool,
    client_addr: Option<SocketAddr>,
}

impl Default for Client {
    fn default() -> Self {
        Client {
            is_user_valid: false,
            is_logged_in: false,
            username: None,
            user: None,
            cwd: "/".to_string(),
            rename_from: None,
            is_data_channel_init: false,
            client_addr: None,
        }
    }
}

impl Client {
    /// Drops all authentication and session state, returning the client
    /// to the pre-login state with the working directory at the root.
    pub fn logout(&mut self) {
        self.is_user_valid = false;
        self.is_logged_in = false;
        self.username = None;
        self.user = None;
        self.cwd = "/".to_string();
        self.rename_from = None;
        self.is_data_channel_init = false;
    }

    // Getters

    pub fn is_user_valid(&self) -> bool {
        self.is_user_valid
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Authenticated identity; present only after a successful PASS.
    pub fn user(&self) -> Option<&DfsUser> {
        self.user.as_ref()
    }

    /// Working directory in the virtual namespace, always normalized.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn rename_from(&self) -> Option<&str> {
        self.rename_from.as_deref()
    }

    pub fn is_data_channel_init(&self) -> bool {
        self.is_data_channel_init
    }

    pub fn client_addr(&self) -> Option<&SocketAddr> {
        self.client_addr.as_ref()
    }

    // Setters

    pub fn set_user_valid(&mut self, valid: bool) {
        self.is_user_valid = valid;
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.is_logged_in = logged_in;
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_user(&mut self, user: Option<DfsUser>) {
        self.user = user;
    }

    pub fn set_cwd(&mut self, cwd: String) {
        self.cwd = cwd;
    }

    pub fn set_rename_from(&mut self, path: Option<String>) {
        self.rename_from = path;
    }

    /// Takes the pending rename source, clearing it.
    pub fn take_rename_from(&mut self) -> Option<String> {
        self.rename_from.take()
    }

    pub fn set_data_channel_init(&mut self, init: bool) {
        self.is_data_channel_init = init;
    }

    pub fn set_client_addr(&mut self, addr: Option<SocketAddr>) {
        self.client_addr = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_starts_at_root_logged_out() {
        let client = Client::default();
        assert!(!client.is_logged_in());
        assert_eq!(client.cwd(), "/");
        assert!(client.user().is_none());
    }

    #[test]
    fn logout_resets_everything() {
        let mut client = Client::default();
        client.set_user_valid(true);
        client.set_logged_in(true);
        client.set_username(Some("alice".into()));
        client.set_user(Some(DfsUser::new("alice", vec!["staff".into()])));
        client.set_cwd("/reports".into());
        client.set_rename_from(Some("/a.txt".into()));
        client.set_data_channel_init(true);

        client.logout();
        assert!(!client.is_logged_in());
        assert!(!client.is_user_valid());
        assert!(client.username().is_none());
        assert!(client.user().is_none());
        assert_eq!(client.cwd(), "/");
        assert!(client.rename_from().is_none());
        assert!(!client.is_data_channel_init());
    }

    #[test]
    fn rename_source_is_taken_once() {
        let mut client = Client::default();
        client.set_rename_from(Some("/a.txt".into()));
        assert_eq!(client.take_rename_from().as_deref(), Some("/a.txt"));
        assert!(client.take_rename_from().is_none());
    }
}
