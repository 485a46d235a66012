//! OAuth2 authorization-code handshake

pub mod manager;

pub use manager::AuthManager;
