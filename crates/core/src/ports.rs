//! Port interfaces
//!
//! These traits define the boundaries between the client logic and the
//! host: the network, session persistence, and the place the resource owner
//! is sent to authorize.

use moneybird_domain::{RawResponse, Result, SessionState};

use crate::options::TransportOptions;

/// Executes one fully composed request.
///
/// Implementations block until the exchange completes. A failure that
/// produced no HTTP response is reported as `MoneybirdError::Transport`;
/// any status code, including errors, is returned as a [`RawResponse`].
pub trait Transport {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse> {
        (**self).execute(options)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse> {
        (**self).execute(options)
    }
}

/// Persists the session between client instances.
pub trait SessionStore {
    /// Load the last saved session; an empty session when nothing is stored.
    fn load(&self) -> Result<SessionState>;

    /// Replace the stored session.
    fn save(&self, state: &SessionState) -> Result<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn load(&self) -> Result<SessionState> {
        (**self).load()
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Box<T> {
    fn load(&self) -> Result<SessionState> {
        (**self).load()
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state)
    }
}

/// Told when the resource owner has to visit the authorization URL.
pub trait AuthorizationNotifier {
    fn authorization_required(&self, authorization_url: &str);
}

impl<T: AuthorizationNotifier + ?Sized> AuthorizationNotifier for &T {
    fn authorization_required(&self, authorization_url: &str) {
        (**self).authorization_required(authorization_url);
    }
}

impl<T: AuthorizationNotifier + ?Sized> AuthorizationNotifier for Box<T> {
    fn authorization_required(&self, authorization_url: &str) {
        (**self).authorization_required(authorization_url);
    }
}
