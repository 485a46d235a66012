//! HTTP transport and request execution

pub mod client;
pub mod executor;

pub use client::HttpTransport;
pub use executor::RequestExecutor;
