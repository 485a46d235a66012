//! # Moneybird Core
//!
//! Pure client logic - no network code.
//!
//! This crate contains:
//! - Content negotiation (format detection and decoding of bodies)
//! - Transport option composition (layered, right-biased merge)
//! - Authorization handshake helpers (URLs, nonces, token request params)
//! - Port interfaces (traits) implemented by `moneybird-infra`
//!
//! ## Architecture Principles
//! - Only depends on `moneybird-domain`
//! - All I/O via the traits in [`ports`]

pub mod auth;
pub mod negotiation;
pub mod options;
pub mod ports;

pub use auth::AuthorizationRequest;
pub use negotiation::{
    content_type_from_headers, content_type_from_raw, decode_body, decode_response, json_params,
    request_body_type,
};
pub use options::{compose_request_options, compose_url, encode_query, RequestBody, TransportOptions};
pub use ports::{AuthorizationNotifier, SessionStore, Transport};
