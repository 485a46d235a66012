//! # Moneybird Infrastructure
//!
//! Implementations of the `moneybird-core` ports and the client built on
//! top of them.
//!
//! This crate contains:
//! - The blocking reqwest transport and the request executor
//! - The OAuth2 authorization manager
//! - Session stores (memory, JSON file) and the log notifier
//! - `MoneybirdClient` with the administration-scoped operations
//! - Configuration loading from the environment or a file
//!
//! ## Architecture
//! - Implements traits defined in `moneybird-core`
//! - Depends on `moneybird-domain` and `moneybird-core`
//! - Contains all "impure" code (network and file I/O)

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod moneybird;
pub mod notifier;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use auth::AuthManager;
pub use errors::InfraError;
pub use http::{HttpTransport, RequestExecutor};
pub use moneybird::{AdministrationScope, DefaultClient, MoneybirdClient};
pub use notifier::LogNotifier;
pub use session::{FileSessionStore, MemorySessionStore};
