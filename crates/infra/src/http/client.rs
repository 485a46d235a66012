use std::sync::Mutex;
use std::time::Duration;

use moneybird_core::{RequestBody, Transport, TransportOptions};
use moneybird_domain::{Headers, MoneybirdError, RawResponse, Result};
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder};
use reqwest::Method;
use tracing::debug;

use crate::errors::InfraError;

/// Client-level settings; a change rebuilds the underlying reqwest client.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClientKey {
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    verify_tls: bool,
}

impl ClientKey {
    fn from_options(options: &TransportOptions) -> Self {
        Self {
            user_agent: options.user_agent.clone(),
            connect_timeout: options.connect_timeout,
            verify_tls: options.verify_tls.unwrap_or(true),
        }
    }
}

/// Blocking HTTP transport backed by `reqwest::blocking`.
///
/// Must not be called from inside an async runtime; wrap calls in
/// `spawn_blocking` there.
pub struct HttpTransport {
    use_system_proxy: bool,
    cached: Mutex<Option<(ClientKey, ReqwestClient)>>,
}

impl HttpTransport {
    /// Transport that ignores proxy environment variables.
    #[must_use]
    pub fn new() -> Self {
        Self { use_system_proxy: false, cached: Mutex::new(None) }
    }

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`.
    #[must_use]
    pub fn with_system_proxy(mut self) -> Self {
        self.use_system_proxy = true;
        self
    }

    fn client_for(&self, options: &TransportOptions) -> Result<ReqwestClient> {
        let key = ClientKey::from_options(options);
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| MoneybirdError::Internal("http client cache lock poisoned".into()))?;

        if let Some((cached_key, client)) = cached.as_ref() {
            if *cached_key == key {
                return Ok(client.clone());
            }
        }

        let client = self.build_client(&key)?;
        *cached = Some((key, client.clone()));
        Ok(client)
    }

    fn build_client(&self, key: &ClientKey) -> Result<ReqwestClient> {
        let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = &key.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        if let Some(timeout) = key.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if !key.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            MoneybirdError::from(infra)
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse> {
        let url = options
            .url
            .as_deref()
            .ok_or_else(|| MoneybirdError::InvalidInput("request has no URL".into()))?;
        let method = options.resolved_method();
        let method = Method::from_bytes(method.as_str().as_bytes()).map_err(|err| {
            MoneybirdError::InvalidInput(format!("invalid HTTP method {method}: {err}"))
        })?;

        let client = self.client_for(options)?;
        let request = apply_options(client.request(method.clone(), url), options);

        debug!(%method, %url, "sending HTTP request");
        let response = request.send().map_err(|err| {
            let infra: InfraError = err.into();
            MoneybirdError::from(infra)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
            .collect::<Headers>();

        let body = if options.capture_body.unwrap_or(true) {
            response.text().map_err(|err| {
                let infra: InfraError = err.into();
                MoneybirdError::from(infra)
            })?
        } else {
            String::new()
        };

        debug!(%method, %url, status, bytes = body.len(), "received HTTP response");
        Ok(RawResponse { status, headers, body })
    }
}

fn apply_options(mut request: RequestBuilder, options: &TransportOptions) -> RequestBuilder {
    if let Some(headers) = &options.headers {
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
    }

    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    match &options.body {
        Some(RequestBody::Json(body) | RequestBody::Form(body) | RequestBody::Raw(body)) => {
            request.body(body.clone())
        }
        None => request,
    }
}
