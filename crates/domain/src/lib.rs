//! # Moneybird Domain
//!
//! Plain data types shared by the Moneybird client crates.
//!
//! This crate contains:
//! - The error taxonomy and `Result` alias
//! - Credentials, session state and the authorization stages
//! - Request/response descriptions (methods, params, headers, envelopes)
//! - Resource payloads (payments, invoice sending) and the soft-failure
//!   `Outcome` type
//! - Client configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Moneybird crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
