//! Authorization state machine
//!
//! ```text
//! NoCode --issue URL--> AwaitingRedirect --code + nonce--> HasCode
//!        --token exchange--> HasToken --administrations--> Verified
//! ```
//!
//! The stage is derived from the session fields, so a manager built from a
//! persisted session resumes where the previous one stopped. Every state
//! change is written to the [`SessionStore`] before the call returns.

use moneybird_core::auth::{authorization_request, redirect_uri_of, token_exchange_params, verify_nonce};
use moneybird_core::{AuthorizationNotifier, SessionStore, Transport};
use moneybird_domain::constants::{DEFAULT_REDIRECT_URI, RESOURCE_SUFFIX};
use moneybird_domain::{
    scalar_to_string, Administration, ApiEndpoints, AuthFailure, AuthStage, ClientCredentials,
    MoneybirdError, RequestSpec, Result, SessionState,
};
use tracing::{debug, info, warn};

use crate::http::RequestExecutor;

/// Owns the session and drives the handshake.
pub struct AuthManager<S, N> {
    credentials: ClientCredentials,
    endpoints: ApiEndpoints,
    session: SessionState,
    store: S,
    notifier: N,
}

impl<S: SessionStore, N: AuthorizationNotifier> AuthManager<S, N> {
    /// Build a manager, resuming from whatever `store` holds.
    ///
    /// # Errors
    /// Propagates the store's load error.
    pub fn new(
        credentials: ClientCredentials,
        endpoints: ApiEndpoints,
        store: S,
        notifier: N,
    ) -> Result<Self> {
        let session = store.load()?;
        debug!(stage = %session.stage(), "session loaded");
        Ok(Self { credentials, endpoints, session, store, notifier })
    }

    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stage(&self) -> AuthStage {
        self.session.stage()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.bearer_token()
    }

    /// Administration resolved by the last verification.
    pub fn administration(&self) -> Option<Administration> {
        self.session.administration().map(|id| Administration {
            id: id.to_string(),
            name: self.session.administration_name.clone(),
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    pub const fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Advance the handshake as far as the stored session allows.
    ///
    /// Without a code an authorization URL is issued (or the pending one
    /// re-announced). A stored code is exchanged and verified; a stored
    /// token is verified directly.
    ///
    /// # Errors
    /// Errors of [`Self::exchange_token`] and [`Self::verify_session`].
    pub fn init<T: Transport>(&mut self, executor: &RequestExecutor<T>) -> Result<AuthStage> {
        match self.stage() {
            AuthStage::NoCode => {
                self.begin_authorization()?;
            }
            AuthStage::AwaitingRedirect => {
                if let Some(url) = self.session.auth_url.as_deref() {
                    self.notifier.authorization_required(url);
                }
            }
            AuthStage::HasCode => {
                self.exchange_token(executor)?;
                if self.stage() == AuthStage::HasToken {
                    self.verify_session(executor)?;
                }
            }
            AuthStage::HasToken | AuthStage::Verified => {
                self.verify_session(executor)?;
            }
        }
        Ok(self.stage())
    }

    /// Issue a fresh authorization URL and notify the resource owner.
    ///
    /// Any previous code, token or administration is discarded.
    ///
    /// # Errors
    /// `Config` for an unusable redirect URI, or the store's save error.
    pub fn begin_authorization(&mut self) -> Result<String> {
        let request = authorization_request(&self.endpoints.authorize_url, &self.credentials)?;

        self.session = SessionState { auth_url: Some(request.url.clone()), ..SessionState::default() };
        self.persist()?;

        info!(stage = %self.stage(), "authorization URL issued");
        self.notifier.authorization_required(&request.url);
        Ok(request.url)
    }

    /// Accept the code from an inbound redirect.
    ///
    /// The nonce must match the one embedded in the pending authorization
    /// URL; otherwise the session is left untouched.
    ///
    /// # Errors
    /// `Auth(NonceMismatch)` or `Auth(MissingNonce)`, `InvalidInput` for an
    /// empty code, or the store's save error.
    pub fn accept_redirect(&mut self, code: &str, nonce: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(MoneybirdError::InvalidInput("authorization code is empty".into()));
        }

        verify_nonce(self.session.auth_url.as_deref(), nonce).inspect_err(|err| {
            warn!(error = %err, "rejected authorization redirect");
        })?;

        self.session.authorization_code = Some(code.to_string());
        self.session.access_token = None;
        self.session.refresh_token = None;
        self.session.administration_id = None;
        self.session.administration_name = None;
        self.persist()?;

        info!(stage = %self.stage(), "authorization code accepted");
        Ok(())
    }

    /// Exchange the stored code at the token endpoint.
    ///
    /// Every field of the response is merged into the session as-is.
    ///
    /// # Errors
    /// `InvalidInput` without a stored code, `Decode` for a non-mapping
    /// response, transport and HTTP errors from the executor.
    pub fn exchange_token<T: Transport>(&mut self, executor: &RequestExecutor<T>) -> Result<()> {
        let code = self
            .session
            .authorization_code
            .clone()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| MoneybirdError::InvalidInput("no authorization code to exchange".into()))?;

        let redirect_uri = self
            .session
            .auth_url
            .as_deref()
            .and_then(redirect_uri_of)
            .or_else(|| self.credentials.redirect_uri().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        let spec = RequestSpec::post(&self.endpoints.token_url)
            .with_params(token_exchange_params(&self.credentials, &code, &redirect_uri));
        let envelope = executor.execute(&spec, None)?;

        let fields = envelope.body.as_object().ok_or_else(|| {
            MoneybirdError::Decode("token endpoint returned a non-mapping body".into())
        })?;
        self.session.merge_token_fields(fields);
        self.session.auth_url = None;
        self.persist()?;

        if self.session.bearer_token().is_none() {
            warn!(
                fields = ?fields.keys().collect::<Vec<_>>(),
                "token endpoint response carried no access token"
            );
        }
        info!(stage = %self.stage(), "authorization code exchanged");
        Ok(())
    }

    /// Resolve the administration the token grants access to.
    ///
    /// The first entry of the administrations listing wins.
    ///
    /// # Errors
    /// `Auth(ConnectionRejected)` for an error-shaped or empty listing,
    /// `InvalidInput` without a token, transport and HTTP errors from the
    /// executor.
    pub fn verify_session<T: Transport>(
        &mut self,
        executor: &RequestExecutor<T>,
    ) -> Result<Administration> {
        let token = self.session.bearer_token().ok_or_else(|| {
            MoneybirdError::InvalidInput("no access token; complete the authorization first".into())
        })?;

        let url = format!("{}/administrations{RESOURCE_SUFFIX}", self.endpoints.versioned_root());
        let envelope = executor.execute(&RequestSpec::get(url), Some(token))?;

        if let Some(message) = envelope.error_message() {
            warn!(error = %message, "administration verification rejected");
            return Err(AuthFailure::ConnectionRejected(message).into());
        }

        let first = envelope.first().ok_or_else(|| {
            warn!("administration listing is empty");
            AuthFailure::ConnectionRejected("no administration available for this token".into())
        })?;
        let id = first.get("id").and_then(scalar_to_string).filter(|id| !id.is_empty()).ok_or_else(
            || AuthFailure::ConnectionRejected("administration entry has no id".into()),
        )?;
        let name = first.get("name").and_then(scalar_to_string);

        self.session.set_administration(id.clone(), name.clone());
        self.persist()?;

        info!(administration_id = %id, stage = %self.stage(), "session verified");
        Ok(Administration { id, name })
    }

    /// Forget the session entirely.
    ///
    /// # Errors
    /// The store's save error.
    pub fn reset(&mut self) -> Result<()> {
        self.session = SessionState::default();
        self.persist()?;
        info!("session reset");
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.session)
    }
}
