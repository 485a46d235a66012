#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use moneybird_core::AuthorizationNotifier;
use moneybird_domain::{ApiEndpoints, ClientConfig, ClientCredentials, SessionState};
use moneybird_infra::{HttpTransport, MemorySessionStore, MoneybirdClient};

pub type TestClient = MoneybirdClient<HttpTransport, MemorySessionStore, SharedNotifier>;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Notifier whose recorded URLs stay readable after the client takes it.
#[derive(Clone, Default)]
pub struct SharedNotifier {
    urls: Arc<Mutex<Vec<String>>>,
}

impl SharedNotifier {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn last(&self) -> Option<String> {
        self.urls().last().cloned()
    }
}

impl AuthorizationNotifier for SharedNotifier {
    fn authorization_required(&self, authorization_url: &str) {
        self.urls.lock().expect("notifier mutex poisoned").push(authorization_url.to_string());
    }
}

/// Configuration for client `A`/`B` pointed at a mock server.
pub fn config_for(server_uri: &str) -> ClientConfig {
    let mut config =
        ClientConfig::new(ClientCredentials::new("A", "B", None).expect("valid credentials"));
    config.endpoints = ApiEndpoints::for_host(server_uri);
    config.transport.timeout_secs = 5;
    config.transport.connect_timeout_secs = 5;
    config
}

/// Session holding token `T` for administration `123`.
pub fn verified_session() -> SessionState {
    let mut state = SessionState { access_token: Some("T".into()), ..SessionState::default() };
    state.set_administration("123", Some("Acme".into()));
    state
}

pub fn client_with(server_uri: &str, state: SessionState, notifier: SharedNotifier) -> TestClient {
    MoneybirdClient::with_parts(
        config_for(server_uri),
        HttpTransport::new(),
        MemorySessionStore::with_state(state),
        notifier,
    )
    .expect("client should build")
}

pub fn verified_client(server_uri: &str) -> TestClient {
    client_with(server_uri, verified_session(), SharedNotifier::default())
}
