//! Request and response descriptions
//!
//! These types describe HTTP exchanges as plain data. The core crate composes
//! them into transport options and decodes raw responses; only the infra
//! transport touches the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::JSON_BODY_KEY;
use crate::impl_wire_name_conversions;

/// HTTP method of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Head,
    /// Any other verb, stored uppercase (`PUT`, `DELETE`, ...).
    Other(String),
}

impl HttpMethod {
    /// Parse a method name case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Header map with case-insensitive names.
///
/// Names are stored lowercase; inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(&name.to_ascii_lowercase())
    }

    /// Union with `other`; values from `other` win on conflicting names.
    pub fn extend_from(&mut self, other: &Self) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Request parameters.
///
/// Ordered key/value fields plus an optional pre-serialized JSON payload.
/// The payload travels under the reserved [`JSON_BODY_KEY`]; when it is set
/// the fields are not sent as the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    fields: Vec<(String, String)>,
    json: Option<String>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Params carrying only a pre-serialized JSON body.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self { fields: Vec::new(), json: Some(body.into()) }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field, replacing an existing one in place. The reserved key sets
    /// the JSON payload instead.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key == JSON_BODY_KEY {
            self.json = Some(value);
            return;
        }
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Non-empty JSON payload, if one was supplied.
    #[must_use]
    pub fn json_body(&self) -> Option<&str> {
        self.json.as_deref().filter(|body| !body.is_empty())
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.json_body().is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// One API call as the caller describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Absolute URL of the call.
    pub url: String,
    pub params: Params,
    pub headers: Headers,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), params: Params::new(), headers: Headers::new() }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }
}

/// Wire format of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Json,
    UrlEncoded,
    Xml,
    /// Not yet determined; must resolve to one of the others.
    Auto,
}

impl_wire_name_conversions!(ContentType {
    Json => "json",
    UrlEncoded => "urlencoded",
    Xml => "xml",
    Auto => "auto",
});

impl ContentType {
    /// `false` only for [`ContentType::Auto`].
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Auto)
    }
}

/// Undecoded response as handed back by a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

/// Decoded response body together with the status and headers it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Headers,
    /// Format the body was decoded from; `None` for an empty body.
    pub content_type: Option<ContentType>,
    pub body: Value,
}

impl ResponseEnvelope {
    /// Text of the `error` field when the body is error-shaped.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let error = self.body.as_object()?.get("error")?;
        Some(match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        })
    }

    #[must_use]
    pub fn is_error_shaped(&self) -> bool {
        self.error_message().is_some()
    }

    /// Field of an object body.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.as_object()?.get(key)
    }

    /// First element of a sequence body.
    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.body.as_array()?.first()
    }

    /// Elements of a sequence body; empty for anything else.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        self.body.as_array().map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }
}
