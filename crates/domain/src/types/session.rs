//! Credentials and OAuth2 session state

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MoneybirdError, Result};
use crate::impl_wire_name_conversions;

/// OAuth client registration. Immutable once built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<String>,
}

impl ClientCredentials {
    /// Build credentials, failing when the client id or secret is blank.
    ///
    /// # Errors
    /// Returns `MoneybirdError::Config` if either value is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Option<String>,
    ) -> Result<Self> {
        let credentials = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.filter(|uri| !uri.trim().is_empty()),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Re-check invariants on values that bypassed [`ClientCredentials::new`]
    /// (deserialized configuration).
    ///
    /// # Errors
    /// Returns `MoneybirdError::Config` if the client id or secret is blank.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(MoneybirdError::Config(
                "a client id and client secret are required to build the client".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Where a session sits in the authorization handshake.
///
/// Stages only move forward during one handshake:
/// `NoCode -> AwaitingRedirect -> HasCode -> HasToken -> Verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthStage {
    NoCode,
    AwaitingRedirect,
    HasCode,
    HasToken,
    Verified,
}

impl_wire_name_conversions!(AuthStage {
    NoCode => "no_code",
    AwaitingRedirect => "awaiting_redirect",
    HasCode => "has_code",
    HasToken => "has_token",
    Verified => "verified",
});

/// Mutable OAuth2 credential bundle tracked across the handshake.
///
/// Field names follow the token endpoint. Unknown fields returned by the
/// token endpoint (`token_type`, `expires_in`, `scope`, ...) are kept in
/// `extra` so a save/load round trip preserves them.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administration_name: Option<String>,
    /// Authorization URL issued for the pending handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SessionState {
    /// Derive the handshake stage from the fields that are present.
    #[must_use]
    pub fn stage(&self) -> AuthStage {
        if present(self.access_token.as_ref()) {
            if present(self.administration_id.as_ref()) {
                AuthStage::Verified
            } else {
                AuthStage::HasToken
            }
        } else if present(self.authorization_code.as_ref()) {
            AuthStage::HasCode
        } else if present(self.auth_url.as_ref()) {
            AuthStage::AwaitingRedirect
        } else {
            AuthStage::NoCode
        }
    }

    /// Access token to attach as a bearer credential, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Verified administration id, if any.
    #[must_use]
    pub fn administration(&self) -> Option<&str> {
        self.administration_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Merge every field of a token endpoint response into the session.
    ///
    /// Known fields are assigned, `null` clears them, anything else lands in
    /// `extra` untouched.
    pub fn merge_token_fields(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            let slot = match key.as_str() {
                "authorization_code" => &mut self.authorization_code,
                "access_token" => &mut self.access_token,
                "refresh_token" => &mut self.refresh_token,
                "administration_id" => &mut self.administration_id,
                "administration_name" => &mut self.administration_name,
                "auth_url" => &mut self.auth_url,
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                    continue;
                }
            };
            *slot = scalar_to_string(value);
        }
    }

    /// Record the administration resolved during verification.
    pub fn set_administration(&mut self, id: impl Into<String>, name: Option<String>) {
        self.administration_id = Some(id.into());
        self.administration_name = name;
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("SessionState")
            .field("stage", &self.stage())
            .field("authorization_code", &redact(&self.authorization_code))
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("administration_id", &self.administration_id)
            .field("administration_name", &self.administration_name)
            .field("auth_url", &self.auth_url)
            .field("extra_fields", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Render a JSON scalar the way it is stored in the session.
///
/// Ids arrive either as strings or as numbers depending on the endpoint.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn credentials_require_id_and_secret() {
        assert!(ClientCredentials::new("A", "B", None).is_ok());
        assert!(matches!(
            ClientCredentials::new("", "B", None),
            Err(MoneybirdError::Config(_))
        ));
        assert!(matches!(
            ClientCredentials::new("A", "  ", None),
            Err(MoneybirdError::Config(_))
        ));
    }

    #[test]
    fn blank_redirect_uri_is_dropped() {
        let credentials = ClientCredentials::new("A", "B", Some(String::new())).unwrap();
        assert_eq!(credentials.redirect_uri(), None);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = ClientCredentials::new("A", "very-secret", None).unwrap();
        assert!(!format!("{credentials:?}").contains("very-secret"));

        let session =
            SessionState { access_token: Some("bearer-value-xyz".into()), ..Default::default() };
        assert!(!format!("{session:?}").contains("bearer-value-xyz"));
    }

    #[test]
    fn stage_follows_present_fields() {
        let mut session = SessionState::default();
        assert_eq!(session.stage(), AuthStage::NoCode);

        session.auth_url = Some("https://example.test/authorize".into());
        assert_eq!(session.stage(), AuthStage::AwaitingRedirect);

        session.authorization_code = Some("code".into());
        assert_eq!(session.stage(), AuthStage::HasCode);

        session.access_token = Some("T".into());
        assert_eq!(session.stage(), AuthStage::HasToken);

        session.set_administration("123", Some("Acme".into()));
        assert_eq!(session.stage(), AuthStage::Verified);
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let session = SessionState { access_token: Some(String::new()), ..Default::default() };
        assert_eq!(session.bearer_token(), None);
        assert_eq!(session.stage(), AuthStage::NoCode);
    }

    #[test]
    fn token_fields_merge_verbatim() {
        let mut session = SessionState::default();
        let response = json!({
            "access_token": "T",
            "refresh_token": "R",
            "token_type": "bearer",
            "expires_in": 7200,
        });
        session.merge_token_fields(response.as_object().unwrap());

        assert_eq!(session.access_token.as_deref(), Some("T"));
        assert_eq!(session.refresh_token.as_deref(), Some("R"));
        assert_eq!(session.extra.get("token_type"), Some(&json!("bearer")));
        assert_eq!(session.extra.get("expires_in"), Some(&json!(7200)));
    }

    #[test]
    fn session_round_trips_through_json_with_extra_fields() {
        let mut session = SessionState {
            authorization_code: Some("code".into()),
            access_token: Some("T".into()),
            ..Default::default()
        };
        session.extra.insert("scope".into(), json!("sales_invoices bank"));

        let json = serde_json::to_string(&session).unwrap();
        let restored: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn stage_names_parse_back() {
        assert_eq!("verified".parse::<AuthStage>(), Ok(AuthStage::Verified));
        assert_eq!(AuthStage::HasCode.to_string(), "has_code");
    }
}
