//! Administration-scoped resource payloads and operation outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DELIVERY_METHOD_CONCEPT;

/// Result of a write or lookup that reports remote rejections as values
/// instead of errors.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<T> {
    /// The API accepted the call and identified the resource.
    Accepted(T),
    /// The call was refused; carries the error-shaped body's message or the
    /// failed request's error text.
    Rejected(String),
    /// The call went through but no usable identifier came back.
    Unidentified,
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The accepted value, dropping the failure detail.
    #[must_use]
    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected(_) | Self::Unidentified => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Accepted(value) => Outcome::Accepted(f(value)),
            Self::Rejected(reason) => Outcome::Rejected(reason),
            Self::Unidentified => Outcome::Unidentified,
        }
    }
}

/// Administration resolved while verifying a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administration {
    pub id: String,
    pub name: Option<String>,
}

/// `id -> name` (or `id -> description`) table built from a listing.
pub type LookupTable = BTreeMap<String, String>;

/// How a created invoice is delivered.
///
/// `Concept` keeps the invoice as a draft: no send request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeliveryMethod {
    Concept,
    Email,
    Simplerinvoicing,
    Post,
    Manual,
    Other(String),
}

impl DeliveryMethod {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Concept => DELIVERY_METHOD_CONCEPT,
            Self::Email => "Email",
            Self::Simplerinvoicing => "Simplerinvoicing",
            Self::Post => "Post",
            Self::Manual => "Manual",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub const fn is_concept(&self) -> bool {
        matches!(self, Self::Concept)
    }
}

impl From<&str> for DeliveryMethod {
    fn from(value: &str) -> Self {
        match value {
            DELIVERY_METHOD_CONCEPT => Self::Concept,
            "Email" => Self::Email,
            "Simplerinvoicing" => Self::Simplerinvoicing,
            "Post" => Self::Post,
            "Manual" => Self::Manual,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Attributes of a `send_invoice` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSending {
    pub delivery_method: String,
    pub sending_scheduled: bool,
    pub deliver_ubl: bool,
    pub mergeable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<serde_json::Value>,
}

impl InvoiceSending {
    /// Immediate, non-mergeable sending with the given method.
    #[must_use]
    pub fn immediate(delivery_method: &DeliveryMethod, deliver_ubl: bool) -> Self {
        Self {
            delivery_method: delivery_method.as_str().to_string(),
            sending_scheduled: false,
            deliver_ubl,
            mergeable: false,
            email_address: None,
            invoice_date: None,
        }
    }
}

/// Completed upstream payment to register against a sales invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Date the payment completed, as reported upstream.
    pub payment_date: String,
    /// Paid amount in the invoice currency, decimal notation.
    pub amount: String,
    /// Payment processor transaction id.
    pub transaction_identifier: String,
}
