//! Client facade over the executor and the authorization manager

use moneybird_core::{AuthorizationNotifier, SessionStore, Transport, TransportOptions};
use moneybird_domain::{
    ApiEndpoints, AuthStage, ClientConfig, Headers, HttpMethod, MoneybirdError, Params,
    RequestSpec, ResponseEnvelope, Result, SessionState,
};
use tracing::{debug, info};

use super::administration::AdministrationScope;
use crate::auth::AuthManager;
use crate::http::{HttpTransport, RequestExecutor};
use crate::notifier::LogNotifier;
use crate::session::{FileSessionStore, MemorySessionStore};

/// Session store chosen from configuration.
pub type DynSessionStore = Box<dyn SessionStore + Send + Sync>;

/// Client wired with the reqwest transport and a configured session store.
pub type DefaultClient = MoneybirdClient<HttpTransport, DynSessionStore, LogNotifier>;

/// Authenticated Moneybird API client.
///
/// Not internally synchronized: callers sharing one client across threads
/// must serialize access themselves.
pub struct MoneybirdClient<T, S = MemorySessionStore, N = LogNotifier> {
    executor: RequestExecutor<T>,
    auth: AuthManager<S, N>,
    endpoints: ApiEndpoints,
}

impl DefaultClient {
    /// Build a client from configuration.
    ///
    /// The session is kept in `session_file` when configured, in memory
    /// otherwise.
    ///
    /// # Errors
    /// `Config` for invalid configuration, or the session store's load error.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let store: DynSessionStore = match &config.session_file {
            Some(path) => Box::new(FileSessionStore::new(path.clone())),
            None => Box::new(MemorySessionStore::new()),
        };
        Self::with_parts(config, HttpTransport::new(), store, LogNotifier)
    }
}

impl<T: Transport, S: SessionStore, N: AuthorizationNotifier> MoneybirdClient<T, S, N> {
    /// Build a client from explicit collaborators.
    ///
    /// # Errors
    /// `Config` for invalid configuration, or the session store's load error.
    pub fn with_parts(config: ClientConfig, transport: T, store: S, notifier: N) -> Result<Self> {
        config.validate()?;
        let ClientConfig { credentials, endpoints, transport: settings, .. } = config;

        let executor = RequestExecutor::new(transport, &settings);
        let auth = AuthManager::new(credentials, endpoints.clone(), store, notifier)?;
        debug!(client_id = %auth.credentials().client_id(), stage = %auth.stage(), "client constructed");

        Ok(Self { executor, auth, endpoints })
    }

    /// Advance the authorization handshake from the stored session.
    ///
    /// # Errors
    /// See [`AuthManager::init`].
    pub fn init(&mut self) -> Result<AuthStage> {
        self.auth.init(&self.executor)
    }

    /// Issue a new authorization URL, discarding the current session.
    ///
    /// # Errors
    /// See [`AuthManager::begin_authorization`].
    pub fn begin_authorization(&mut self) -> Result<String> {
        self.auth.begin_authorization()
    }

    /// Accept an inbound redirect and complete the handshake.
    ///
    /// # Errors
    /// Nonce errors from [`AuthManager::accept_redirect`], then anything
    /// [`Self::init`] returns.
    pub fn handle_redirect(&mut self, code: &str, nonce: &str) -> Result<AuthStage> {
        self.auth.accept_redirect(code, nonce)?;
        self.init()
    }

    /// # Errors
    /// See [`AuthManager::accept_redirect`].
    pub fn accept_redirect(&mut self, code: &str, nonce: &str) -> Result<()> {
        self.auth.accept_redirect(code, nonce)
    }

    /// # Errors
    /// See [`AuthManager::exchange_token`].
    pub fn exchange_token(&mut self) -> Result<()> {
        self.auth.exchange_token(&self.executor)
    }

    /// # Errors
    /// See [`AuthManager::verify_session`].
    pub fn verify_session(&mut self) -> Result<moneybird_domain::Administration> {
        self.auth.verify_session(&self.executor)
    }

    /// Authorization URL waiting for a redirect, if any.
    pub fn authorization_url(&self) -> Option<&str> {
        self.auth.session().auth_url.as_deref()
    }

    pub fn session(&self) -> &SessionState {
        self.auth.session()
    }

    pub fn stage(&self) -> AuthStage {
        self.auth.stage()
    }

    pub const fn auth(&self) -> &AuthManager<S, N> {
        &self.auth
    }

    pub const fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    pub const fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Replace the caller override layer applied to every request.
    pub fn set_transport_overrides(&mut self, overrides: TransportOptions) {
        info!("transport overrides replaced");
        self.executor.set_overrides(overrides);
    }

    pub const fn transport_overrides(&self) -> &TransportOptions {
        self.executor.overrides()
    }

    /// Call an arbitrary endpoint.
    ///
    /// An absolute `http(s)://` URL is used as-is; anything else is joined
    /// to the site URL. The bearer token is attached when present.
    ///
    /// # Errors
    /// Executor errors.
    pub fn api(
        &self,
        sub_url: &str,
        method: HttpMethod,
        params: Params,
        headers: Headers,
    ) -> Result<ResponseEnvelope> {
        let url = resolve_url(&self.endpoints.site_url, sub_url);
        let spec = RequestSpec::new(method, url).with_params(params).with_headers(headers);
        self.executor.execute(&spec, self.auth.access_token())
    }

    /// Operations scoped to the verified administration.
    ///
    /// # Errors
    /// `MissingAdministration` until [`Self::init`] or
    /// [`Self::verify_session`] has resolved one.
    pub fn administration(&self) -> Result<AdministrationScope<'_, T>> {
        let session = self.auth.session();
        match (session.bearer_token(), session.administration()) {
            (Some(token), Some(id)) => Ok(AdministrationScope::new(
                &self.executor,
                token,
                &self.endpoints.versioned_root(),
                id,
            )),
            _ => Err(MoneybirdError::MissingAdministration),
        }
    }
}

fn resolve_url(site_url: &str, sub_url: &str) -> String {
    let lower = sub_url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return sub_url.to_string();
    }
    format!("{}/{}", site_url.trim_end_matches('/'), sub_url.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use moneybird_domain::ClientCredentials;
    use serde_json::json;

    use super::*;
    use crate::testing::{RecordingNotifier, ScriptedTransport};

    type TestClient = MoneybirdClient<ScriptedTransport, MemorySessionStore, RecordingNotifier>;

    fn client_with(transport: ScriptedTransport, state: SessionState) -> TestClient {
        let config = ClientConfig::new(ClientCredentials::new("A", "B", None).unwrap());
        MoneybirdClient::with_parts(
            config,
            transport,
            MemorySessionStore::with_state(state),
            RecordingNotifier::new(),
        )
        .unwrap()
    }

    fn verified() -> SessionState {
        let mut state = SessionState { access_token: Some("T".into()), ..SessionState::default() };
        state.set_administration("42", Some("Acme".into()));
        state
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ClientConfig::new(ClientCredentials::new("A", "B", None).unwrap());
        config.endpoints.token_url = String::new();
        let result = MoneybirdClient::with_parts(
            config,
            ScriptedTransport::new(),
            MemorySessionStore::new(),
            RecordingNotifier::new(),
        );
        assert!(matches!(result, Err(MoneybirdError::Config(_))));
    }

    #[test]
    fn administration_scope_requires_verification() {
        let client = client_with(ScriptedTransport::new(), SessionState::default());
        assert!(matches!(client.administration(), Err(MoneybirdError::MissingAdministration)));

        let token_only =
            client_with(ScriptedTransport::new(), SessionState { access_token: Some("T".into()), ..SessionState::default() });
        assert!(matches!(token_only.administration(), Err(MoneybirdError::MissingAdministration)));

        let client = client_with(ScriptedTransport::new(), verified());
        assert_eq!(client.administration().unwrap().administration_id(), "42");
    }

    #[test]
    fn api_joins_relative_paths_to_site_url() {
        let transport = ScriptedTransport::new()
            .respond_json(200, json!({"ok": true}))
            .respond_json(200, json!({"ok": true}));
        let client = client_with(transport, verified());

        client.api("api/v2/42/contacts.json", HttpMethod::Get, Params::new(), Headers::new()).unwrap();
        client
            .api("HTTPS://other.test/x", HttpMethod::Get, Params::new(), Headers::new())
            .unwrap();

        assert_eq!(
            client.executor().transport().urls(),
            vec![
                "https://moneybird.com/api/v2/42/contacts.json".to_string(),
                "HTTPS://other.test/x".to_string()
            ]
        );
        let sent = client.executor().transport().last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer T"));
    }

    #[test]
    fn transport_overrides_apply_to_later_calls() {
        let transport = ScriptedTransport::new().respond_json(200, json!({}));
        let mut client = client_with(transport, verified());

        client.set_transport_overrides(TransportOptions {
            timeout: Some(Duration::from_secs(3)),
            ..TransportOptions::default()
        });
        client.api("x", HttpMethod::Get, Params::new(), Headers::new()).unwrap();

        assert_eq!(client.transport_overrides().timeout, Some(Duration::from_secs(3)));
        let sent = client.executor().transport().last_request().unwrap();
        assert_eq!(sent.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn resolve_url_trims_duplicate_slashes() {
        assert_eq!(resolve_url("https://moneybird.com/", "/api/v2"), "https://moneybird.com/api/v2");
        assert_eq!(resolve_url("https://moneybird.com", "http://x.test"), "http://x.test");
    }
}
