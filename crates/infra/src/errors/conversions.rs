//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use moneybird_domain::MoneybirdError;
use reqwest::Error as HttpError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(#[from] pub MoneybirdError);

impl From<InfraError> for MoneybirdError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMoneybirdError {
    fn into_moneybird(self) -> MoneybirdError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MoneybirdError */
/* -------------------------------------------------------------------------- */

/// Numeric code reported with a transport failure.
///
/// Codes mirror libcurl's errno values:
/// 28 timeout, 7 connect, 3 malformed request, 47 redirect loop,
/// 56 body receive failure, 1 anything else.
#[must_use]
pub fn transport_code(err: &HttpError) -> i32 {
    if err.is_timeout() {
        return 28;
    }
    if err.is_connect() {
        return 7;
    }
    if err.is_builder() || err.is_request() {
        return 3;
    }
    if err.is_redirect() {
        return 47;
    }
    if err.is_body() || err.is_decode() {
        return 56;
    }
    1
}

impl IntoMoneybirdError for HttpError {
    fn into_moneybird(self) -> MoneybirdError {
        let code = transport_code(&self);
        MoneybirdError::Transport { code, message: source_chain(&self) }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_moneybird())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → MoneybirdError */
/* -------------------------------------------------------------------------- */

impl IntoMoneybirdError for IoError {
    fn into_moneybird(self) -> MoneybirdError {
        MoneybirdError::Storage(format!("{:?}: {self}", self.kind()))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_moneybird())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → MoneybirdError */
/* -------------------------------------------------------------------------- */

impl IntoMoneybirdError for toml::de::Error {
    fn into_moneybird(self) -> MoneybirdError {
        MoneybirdError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        Self(value.into_moneybird())
    }
}

/// Error message followed by its sources, `: `-joined.
fn source_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
