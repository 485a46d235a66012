//! Content negotiation
//!
//! Classifies outgoing request bodies and incoming responses as JSON,
//! URL-encoded or XML, and decodes response bodies into `serde_json::Value`.
//!
//! Response classification uses the `Content-Type` header when it names a
//! known format, otherwise the raw body is sniffed with three shape patterns.

mod xml;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use moneybird_domain::{
    ContentType, Headers, MoneybirdError, Params, RawResponse, ResponseEnvelope, Result,
};

static JSON_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\{.*\}$").expect("JSON_SHAPE should compile - this is a bug")
});

static URLENCODED_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^[^=|^&]+=[^=|^&]+(&[^=|^&]+=[^=|^&]+)*$")
        .expect("URLENCODED_SHAPE should compile - this is a bug")
});

static XML_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^<.*>$").expect("XML_SHAPE should compile - this is a bug"));

/// Format of an outgoing body: JSON when a pre-serialized payload is present,
/// URL-encoded params otherwise.
#[must_use]
pub fn request_body_type(params: &Params) -> ContentType {
    if params.json_body().is_some() {
        ContentType::Json
    } else {
        ContentType::UrlEncoded
    }
}

/// Params carrying `value` as the JSON payload.
#[must_use]
pub fn json_params(value: &Value) -> Params {
    Params::json(value.to_string())
}

/// Classify a response from its `Content-Type` header.
///
/// Substring match, case-insensitive. Returns [`ContentType::Auto`] when the
/// header is missing or names none of the known formats.
#[must_use]
pub fn content_type_from_headers(headers: &Headers) -> ContentType {
    let Some(value) = headers.get("content-type") else {
        return ContentType::Auto;
    };
    let value = value.to_ascii_lowercase();
    if value.contains("json") {
        ContentType::Json
    } else if value.contains("urlencoded") {
        ContentType::UrlEncoded
    } else if value.contains("xml") {
        ContentType::Xml
    } else {
        ContentType::Auto
    }
}

/// Classify a raw body by its shape.
///
/// XML is tried before URL-encoding since a single-attribute element such as
/// `<a b="c">` also fits the key/value pattern.
///
/// # Errors
/// `MoneybirdError::ContentTypeIndeterminate` when no pattern matches.
pub fn content_type_from_raw(raw: &str) -> Result<ContentType> {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    if JSON_SHAPE.is_match(raw) {
        Ok(ContentType::Json)
    } else if XML_SHAPE.is_match(raw) {
        Ok(ContentType::Xml)
    } else if URLENCODED_SHAPE.is_match(raw) {
        Ok(ContentType::UrlEncoded)
    } else {
        Err(MoneybirdError::ContentTypeIndeterminate)
    }
}

/// Decode a raw body declared as `content_type`.
///
/// An empty body decodes to an empty mapping without classification and
/// reports no content type. [`ContentType::Auto`] is resolved by sniffing.
///
/// # Errors
/// `ContentTypeIndeterminate` when sniffing fails, `Decode` when the body is
/// malformed for its format.
pub fn decode_body(raw: &str, content_type: ContentType) -> Result<(Option<ContentType>, Value)> {
    if raw.trim().is_empty() {
        return Ok((None, Value::Object(Map::new())));
    }

    let resolved = match content_type {
        ContentType::Auto => content_type_from_raw(raw)?,
        known => known,
    };

    let value = match resolved {
        ContentType::Json => serde_json::from_str(raw)?,
        ContentType::UrlEncoded => decode_urlencoded(raw),
        ContentType::Xml => xml::to_value(raw)?,
        ContentType::Auto => return Err(MoneybirdError::ContentTypeIndeterminate),
    };
    Ok((Some(resolved), value))
}

/// Decode a transport response into an envelope.
///
/// # Errors
/// See [`decode_body`].
pub fn decode_response(response: RawResponse) -> Result<ResponseEnvelope> {
    let declared = content_type_from_headers(&response.headers);
    let (content_type, body) = decode_body(&response.body, declared)?;
    debug!(
        status = response.status,
        declared = %declared,
        resolved = ?content_type,
        "decoded response body"
    );
    Ok(ResponseEnvelope { status: response.status, headers: response.headers, content_type, body })
}

/// Flat key/value mapping; a repeated key keeps its last value.
fn decode_urlencoded(raw: &str) -> Value {
    let fields = url::form_urlencoded::parse(raw.trim().as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect::<Map<_, _>>();
    Value::Object(fields)
}
