//! Session persistence adapters
//!
//! Implementations of [`moneybird_core::SessionStore`].

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
