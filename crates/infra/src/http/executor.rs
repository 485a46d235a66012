//! Request executor
//!
//! Composes transport options for one [`RequestSpec`], runs them through a
//! [`Transport`], enforces the `20x` status rule and hands the body to the
//! content negotiator.

use moneybird_core::{compose_request_options, decode_response, Transport, TransportOptions};
use moneybird_domain::{MoneybirdError, RequestSpec, ResponseEnvelope, Result, TransportSettings};
use tracing::{debug, warn};

/// Executes API calls over a [`Transport`].
pub struct RequestExecutor<T> {
    transport: T,
    defaults: TransportOptions,
    overrides: TransportOptions,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, settings: &TransportSettings) -> Self {
        Self {
            transport,
            defaults: TransportOptions::from_settings(settings),
            overrides: TransportOptions::default(),
        }
    }

    /// Replace the caller override layer.
    pub fn set_overrides(&mut self, overrides: TransportOptions) {
        self.overrides = overrides;
    }

    pub const fn overrides(&self) -> &TransportOptions {
        &self.overrides
    }

    pub const fn defaults(&self) -> &TransportOptions {
        &self.defaults
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one request, attaching `access_token` as a bearer credential when
    /// present.
    ///
    /// # Errors
    /// `Transport` when no response arrived, `HttpStatus` for a status
    /// outside `200..=209`, and the negotiator's errors for the body.
    pub fn execute(&self, spec: &RequestSpec, access_token: Option<&str>) -> Result<ResponseEnvelope> {
        let options = compose_request_options(&self.defaults, &self.overrides, spec, access_token);
        let method = options.resolved_method();
        let url = options.url.clone().unwrap_or_default();

        let response = self.transport.execute(&options).inspect_err(|err| {
            warn!(%method, %url, error = %err, "HTTP request failed");
        })?;

        if !is_success(response.status) {
            warn!(%method, %url, status = response.status, "HTTP request rejected");
            return Err(MoneybirdError::HttpStatus { status: response.status, body: response.body });
        }

        debug!(%method, %url, status = response.status, "HTTP request completed");
        decode_response(response)
    }
}

/// The status text starts with `20`.
fn is_success(status: u16) -> bool {
    status.to_string().starts_with("20")
}
