//! Administration-scoped request helpers
//!
//! Every resource path lives under `{api}/{version}/{administration_id}/`
//! and ends in `.json`. Write bodies wrap the payload under a single
//! resource-name key (`{"contact": {...}}`).

use moneybird_core::Transport;
use moneybird_domain::constants::RESOURCE_SUFFIX;
use moneybird_domain::{
    scalar_to_string, HttpMethod, LookupTable, MoneybirdError, Params, RequestSpec,
    ResponseEnvelope, Result,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::http::RequestExecutor;

/// Operations against one verified administration.
///
/// Borrowed from [`super::MoneybirdClient::administration`]; holds the bearer
/// token and the administration id resolved during verification.
pub struct AdministrationScope<'a, T> {
    executor: &'a RequestExecutor<T>,
    token: &'a str,
    administration_id: &'a str,
    base_url: String,
}

impl<'a, T: Transport> AdministrationScope<'a, T> {
    pub(crate) fn new(
        executor: &'a RequestExecutor<T>,
        token: &'a str,
        versioned_root: &str,
        administration_id: &'a str,
    ) -> Self {
        let base_url = format!("{}/{administration_id}", versioned_root.trim_end_matches('/'));
        Self { executor, token, administration_id, base_url }
    }

    pub const fn administration_id(&self) -> &str {
        self.administration_id
    }

    /// Full URL of a resource path such as `sales_invoices/7/payments`.
    #[must_use]
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}/{}{RESOURCE_SUFFIX}", self.base_url, path.trim_matches('/'))
    }

    pub(crate) fn get(&self, path: &str, params: Params) -> Result<ResponseEnvelope> {
        self.send(RequestSpec::get(self.resource_url(path)).with_params(params))
    }

    /// Send `{key: payload}` as a JSON body.
    pub(crate) fn write<P: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        payload: &P,
    ) -> Result<ResponseEnvelope> {
        let body = wrap(key, payload)?;
        let spec = RequestSpec::new(method, self.resource_url(path))
            .with_params(Params::json(body.to_string()));
        self.send(spec)
    }

    /// Send a write without a body.
    pub(crate) fn touch(&self, method: HttpMethod, path: &str) -> Result<ResponseEnvelope> {
        self.send(RequestSpec::new(method, self.resource_url(path)))
    }

    fn send(&self, spec: RequestSpec) -> Result<ResponseEnvelope> {
        debug!(method = %spec.method, url = %spec.url, "administration request");
        self.executor.execute(&spec, Some(self.token))
    }
}

/// Serialize `payload` and nest it under `key`.
pub(crate) fn wrap<P: Serialize + ?Sized>(key: &str, payload: &P) -> Result<Value> {
    let value = serde_json::to_value(payload)
        .map_err(|err| MoneybirdError::InvalidInput(format!("cannot serialize {key}: {err}")))?;
    let mut wrapped = Map::new();
    wrapped.insert(key.to_string(), value);
    Ok(Value::Object(wrapped))
}

/// Numeric resource id from a response or payload field.
///
/// Accepts JSON numbers and numeric strings; ids larger than `i64` arrive as
/// strings from the API.
pub(crate) fn parse_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Build an id-keyed table from a listing, keeping entries `keep` accepts.
///
/// Entries without an id or without `field` are skipped.
pub(crate) fn lookup_table(
    listing: &ResponseEnvelope,
    field: &str,
    keep: impl Fn(&Map<String, Value>) -> bool,
) -> LookupTable {
    listing
        .items()
        .iter()
        .filter_map(Value::as_object)
        .filter(|entry| keep(entry))
        .filter_map(|entry| {
            let id = entry.get("id").and_then(scalar_to_string)?;
            let value = entry.get(field).and_then(scalar_to_string)?;
            Some((id, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use moneybird_domain::{ContentType, Headers};
    use serde_json::json;

    use super::*;

    fn envelope(body: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            status: 200,
            headers: Headers::new(),
            content_type: Some(ContentType::Json),
            body,
        }
    }

    #[test]
    fn parse_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_id(Some(&json!(42))), Some(42));
        assert_eq!(parse_id(Some(&json!("311296014049526958"))), Some(311_296_014_049_526_958));
        assert_eq!(parse_id(Some(&json!(""))), None);
        assert_eq!(parse_id(Some(&json!("abc"))), None);
        assert_eq!(parse_id(Some(&json!(null))), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn wrap_nests_payload_under_key() {
        let wrapped = wrap("contact", &json!({"firstname": "Jan"})).unwrap();
        assert_eq!(wrapped, json!({"contact": {"firstname": "Jan"}}));
    }

    #[test]
    fn lookup_table_filters_and_skips_incomplete_entries() {
        let listing = envelope(json!([
            {"id": "1", "name": "keep"},
            {"id": 2, "name": "numeric id"},
            {"id": "3"},
            {"name": "no id"},
            {"id": "4", "name": "dropped", "skip": true},
            "not an object"
        ]));

        let table = lookup_table(&listing, "name", |entry| !entry.contains_key("skip"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("1").map(String::as_str), Some("keep"));
        assert_eq!(table.get("2").map(String::as_str), Some("numeric id"));
    }

    #[test]
    fn lookup_table_of_error_body_is_empty() {
        let listing = envelope(json!({"error": "unauthorized"}));
        assert!(lookup_table(&listing, "name", |_| true).is_empty());
    }
}
