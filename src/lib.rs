pub mod auth;
pub mod backend;
pub mod channel_registry;
pub mod client;
pub mod client_handler;
pub mod command;
pub mod config;
pub mod data_channel;
pub mod digest;
pub mod error;
pub mod file_object;
pub mod file_transfer;
pub mod handlers;
pub mod listing;
pub mod path;
pub mod permissions;
pub mod server;
pub mod system;
pub mod user;

pub use server::Server;
