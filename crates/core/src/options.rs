//! Transport option composition
//!
//! A request is described by four option layers, merged left to right:
//!
//! 1. defaults (user agent, timeouts, TLS policy)
//! 2. caller overrides
//! 3. per-request computed options (URL, caller headers + bearer token,
//!    full transfer capture)
//! 4. method-specific body/header computation
//!
//! Later layers win key by key. Headers are the only mapping-valued option:
//! when both sides carry headers they are unioned, right side winning on
//! conflicting names.

use std::time::Duration;

use moneybird_domain::{Headers, HttpMethod, Params, RequestSpec, TransportSettings};

/// Body attached to an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Pre-serialized JSON, sent as `application/json`.
    Json(String),
    /// URL-encoded fields, sent as `application/x-www-form-urlencoded`.
    Form(String),
    /// Sent as-is, without a content type.
    Raw(String),
}

impl RequestBody {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json(body) | Self::Form(body) | Self::Raw(body) => body,
        }
    }

    /// Content type announced for this body, if any.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
            Self::Raw(_) => None,
        }
    }
}

/// One layer (or the merged result) of transport configuration.
///
/// `None` means "not set by this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    pub url: Option<String>,
    /// Request method; unset means GET.
    pub method: Option<HttpMethod>,
    pub headers: Option<Headers>,
    pub body: Option<RequestBody>,
    pub user_agent: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub verify_tls: Option<bool>,
    /// Read the complete response body before returning.
    pub capture_body: Option<bool>,
}

impl TransportOptions {
    /// Default layer built from configuration.
    #[must_use]
    pub fn from_settings(settings: &TransportSettings) -> Self {
        Self {
            user_agent: Some(settings.user_agent.clone()),
            connect_timeout: Some(settings.connect_timeout()),
            timeout: Some(settings.timeout()),
            verify_tls: Some(settings.verify_tls),
            ..Self::default()
        }
    }

    /// Merge `other` over `self`, returning the combined layer.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.headers = match (self.headers, other.headers) {
            (Some(mut left), Some(right)) => {
                left.extend_from(&right);
                Some(left)
            }
            (left, right) => right.or(left),
        };
        self.url = other.url.or(self.url);
        self.method = other.method.or(self.method);
        self.body = other.body.or(self.body);
        self.user_agent = other.user_agent.or(self.user_agent);
        self.connect_timeout = other.connect_timeout.or(self.connect_timeout);
        self.timeout = other.timeout.or(self.timeout);
        self.verify_tls = other.verify_tls.or(self.verify_tls);
        self.capture_body = other.capture_body.or(self.capture_body);
        self
    }

    /// Merge every layer in order.
    #[must_use]
    pub fn merge_all(layers: impl IntoIterator<Item = Self>) -> Self {
        layers.into_iter().fold(Self::default(), Self::merge)
    }

    /// Effective method.
    #[must_use]
    pub fn resolved_method(&self) -> HttpMethod {
        self.method.clone().unwrap_or(HttpMethod::Get)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name)
    }
}

/// RFC 3986 query string of the given fields, `&`-joined.
#[must_use]
pub fn encode_query(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append params to a URL as a query string.
///
/// Uses `&` when the URL already has a query. Empty params leave the URL
/// untouched.
#[must_use]
pub fn compose_url(url: &str, params: &Params) -> String {
    if params.fields().is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", encode_query(params.fields()))
}

/// Layer 4: options that depend on the method.
#[must_use]
pub fn method_options(method: &HttpMethod, url: &str, params: &Params) -> TransportOptions {
    match method {
        HttpMethod::Get => TransportOptions {
            url: Some(compose_url(url, params)),
            ..TransportOptions::default()
        },
        HttpMethod::Head => TransportOptions {
            method: Some(HttpMethod::Head),
            url: (!params.fields().is_empty()).then(|| compose_url(url, params)),
            ..TransportOptions::default()
        },
        HttpMethod::Post | HttpMethod::Patch => {
            let body = match params.json_body() {
                Some(json) => RequestBody::Json(json.to_string()),
                None => RequestBody::Form(encode_query(params.fields())),
            };
            let headers = body
                .content_type()
                .map(|content_type| Headers::new().with("Content-Type", content_type));
            TransportOptions {
                method: Some(method.clone()),
                headers,
                body: Some(body),
                ..TransportOptions::default()
            }
        }
        HttpMethod::Other(_) => {
            let body = if let Some(json) = params.json_body() {
                Some(RequestBody::Raw(json.to_string()))
            } else if params.fields().is_empty() {
                None
            } else {
                Some(RequestBody::Raw(encode_query(params.fields())))
            };
            TransportOptions { method: Some(method.clone()), body, ..TransportOptions::default() }
        }
    }
}

/// Layer 3: URL, caller headers plus bearer token, full capture.
#[must_use]
pub fn computed_options(spec: &RequestSpec, access_token: Option<&str>) -> TransportOptions {
    let mut headers = spec.headers.clone();
    if let Some(token) = access_token.filter(|token| !token.is_empty()) {
        headers.insert("Authorization", format!("Bearer {token}"));
    }
    TransportOptions {
        url: Some(spec.url.clone()),
        headers: Some(headers),
        capture_body: Some(true),
        ..TransportOptions::default()
    }
}

/// Compose the final options for one request.
#[must_use]
pub fn compose_request_options(
    defaults: &TransportOptions,
    overrides: &TransportOptions,
    spec: &RequestSpec,
    access_token: Option<&str>,
) -> TransportOptions {
    TransportOptions::merge_all([
        defaults.clone(),
        overrides.clone(),
        computed_options(spec, access_token),
        method_options(&spec.method, &spec.url, &spec.params),
    ])
}
