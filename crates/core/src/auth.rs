//! Authorization handshake helpers
//!
//! Building the authorization URL, issuing and checking the redirect nonce,
//! and the token endpoint parameters. The state machine itself lives in
//! `moneybird_infra::auth`.
//!
//! The nonce travels inside the redirect URI (`?mb_oauth2=<nonce>`), so the
//! issued authorization URL is the only thing that needs to be kept to check
//! an inbound redirect later.

use rand::Rng;
use url::Url;

use moneybird_domain::constants::{
    DEFAULT_REDIRECT_URI, NONCE_BYTES, NONCE_PARAM, OAUTH_GRANT_TYPE, OAUTH_RESPONSE_TYPE,
    OAUTH_SCOPES,
};
use moneybird_domain::{AuthFailure, ClientCredentials, MoneybirdError, Params, Result};

use crate::options::encode_query;

/// Authorization URL issued to the resource owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    /// Redirect URI including the nonce parameter.
    pub redirect_uri: String,
    pub nonce: String,
}

/// Random hex nonce.
#[must_use]
pub fn generate_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Embed `nonce` into `redirect_uri` unless it already carries one.
///
/// # Errors
/// `MoneybirdError::Config` if the redirect URI is not an absolute URL.
pub fn redirect_with_nonce(redirect_uri: &str, nonce: &str) -> Result<(String, String)> {
    let mut url = Url::parse(redirect_uri)
        .map_err(|err| MoneybirdError::Config(format!("invalid redirect URI: {err}")))?;
    if let Some(existing) = query_value(&url, NONCE_PARAM) {
        return Ok((redirect_uri.to_string(), existing));
    }
    url.query_pairs_mut().append_pair(NONCE_PARAM, nonce);
    Ok((url.into(), nonce.to_string()))
}

/// Build the authorization URL with a fresh nonce.
///
/// Falls back to the local default redirect URI when the credentials carry
/// none.
///
/// # Errors
/// `MoneybirdError::Config` if the redirect URI is not an absolute URL.
pub fn authorization_request(
    authorize_url: &str,
    credentials: &ClientCredentials,
) -> Result<AuthorizationRequest> {
    let base_redirect = credentials.redirect_uri().unwrap_or(DEFAULT_REDIRECT_URI);
    let (redirect_uri, nonce) = redirect_with_nonce(base_redirect, &generate_nonce())?;

    let query = encode_query(&[
        ("client_id".to_string(), credentials.client_id().to_string()),
        ("redirect_uri".to_string(), redirect_uri.clone()),
        ("response_type".to_string(), OAUTH_RESPONSE_TYPE.to_string()),
        ("scope".to_string(), OAUTH_SCOPES.join(" ")),
    ]);
    let separator = if authorize_url.contains('?') { '&' } else { '?' };
    let url = format!("{authorize_url}{separator}{query}");

    Ok(AuthorizationRequest { url, redirect_uri, nonce })
}

/// Redirect URI recorded in an issued authorization URL.
#[must_use]
pub fn redirect_uri_of(auth_url: &str) -> Option<String> {
    Url::parse(auth_url).ok().and_then(|url| query_value(&url, "redirect_uri"))
}

/// Nonce embedded in an issued authorization URL.
#[must_use]
pub fn embedded_nonce(auth_url: &str) -> Option<String> {
    let redirect = redirect_uri_of(auth_url)?;
    let redirect = Url::parse(&redirect).ok()?;
    query_value(&redirect, NONCE_PARAM).filter(|nonce| !nonce.is_empty())
}

/// Check an inbound redirect nonce against the pending authorization URL.
///
/// # Errors
/// `AuthFailure::MissingNonce` when there is no pending URL or it carries no
/// nonce, `AuthFailure::NonceMismatch` when the values differ.
pub fn verify_nonce(auth_url: Option<&str>, inbound: &str) -> Result<()> {
    let expected = auth_url.and_then(embedded_nonce).ok_or(AuthFailure::MissingNonce)?;
    if inbound.is_empty() || expected != inbound {
        return Err(AuthFailure::NonceMismatch.into());
    }
    Ok(())
}

/// Form fields of the authorization-code token request.
#[must_use]
pub fn token_exchange_params(credentials: &ClientCredentials, code: &str, redirect_uri: &str) -> Params {
    Params::new()
        .with("client_id", credentials.client_id())
        .with("client_secret", credentials.client_secret())
        .with("code", code)
        .with("redirect_uri", redirect_uri)
        .with("grant_type", OAUTH_GRANT_TYPE)
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
}
