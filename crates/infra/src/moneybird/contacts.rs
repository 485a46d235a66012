use moneybird_core::Transport;
use moneybird_domain::{
    scalar_to_string, HttpMethod, MoneybirdError, Outcome, Params, ResponseEnvelope, Result,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::administration::{parse_id, AdministrationScope};

const CONTACTS: &str = "contacts";

/// Failed requests become a rejection carrying the error text; payload
/// and decoding errors still propagate.
fn rejected_on_failure<V>(err: MoneybirdError, action: &str) -> Result<Outcome<V>> {
    match err {
        MoneybirdError::HttpStatus { .. } | MoneybirdError::Transport { .. } => {
            warn!(error = %err, "{action} failed");
            Ok(Outcome::Rejected(err.to_string()))
        }
        other => Err(other),
    }
}

impl<T: Transport> AdministrationScope<'_, T> {
    /// Create a contact from a `contact` payload.
    ///
    /// An error-shaped body, a non-`20x` status and a transport failure are
    /// all `Outcome::Rejected`.
    ///
    /// # Errors
    /// Payload serialization and response decoding errors.
    pub fn create_contact<P: Serialize + ?Sized>(&self, contact: &P) -> Result<Outcome<String>> {
        let response = match self.write(HttpMethod::Post, CONTACTS, "contact", contact) {
            Ok(response) => response,
            Err(err) => return rejected_on_failure(err, "contact creation"),
        };

        if let Some(reason) = response.error_message() {
            warn!(%reason, "contact creation rejected");
            return Ok(Outcome::Rejected(reason));
        }

        Ok(match response.field("id").and_then(scalar_to_string).filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(contact_id = %id, "contact created");
                Outcome::Accepted(id)
            }
            None => Outcome::Unidentified,
        })
    }

    /// Update a contact.
    ///
    /// Without `contact_id` the contact is looked up by the payload's
    /// `send_invoices_to_email`; an unsuccessful lookup is returned as-is and
    /// nothing is written.
    ///
    /// # Errors
    /// Transport and HTTP errors of the update request itself.
    pub fn update_contact<P: Serialize + ?Sized>(
        &self,
        contact: &P,
        contact_id: Option<&str>,
    ) -> Result<Outcome<u64>> {
        let contact_id = match contact_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let payload = serde_json::to_value(contact)?;
                let email = payload
                    .get("send_invoices_to_email")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                match self.find_contact(email)? {
                    Outcome::Accepted(id) => id.to_string(),
                    other => return Ok(other),
                }
            }
        };

        let response = self.write(
            HttpMethod::Patch,
            &format!("{CONTACTS}/{contact_id}"),
            "contact",
            contact,
        )?;

        if let Some(reason) = response.error_message() {
            warn!(%contact_id, %reason, "contact update rejected");
            return Ok(Outcome::Rejected(reason));
        }

        Ok(match parse_id(response.field("id")) {
            Some(id) => Outcome::Accepted(id),
            None => {
                warn!(%contact_id, "contact update returned no id");
                Outcome::Unidentified
            }
        })
    }

    /// Id of the first contact matching `email`.
    ///
    /// A failed search is `Outcome::Rejected`.
    ///
    /// # Errors
    /// Response decoding errors.
    pub fn find_contact(&self, email: &str) -> Result<Outcome<u64>> {
        if email.is_empty() {
            return Ok(Outcome::Unidentified);
        }

        let response = match self.get(CONTACTS, Params::new().with("query", email)) {
            Ok(response) => response,
            Err(err) => return rejected_on_failure(err, "contact search"),
        };

        if let Some(reason) = response.error_message() {
            warn!(%reason, "contact search rejected");
            return Ok(Outcome::Rejected(reason));
        }

        Ok(match parse_id(response.first().and_then(|contact| contact.get("id"))) {
            Some(id) => Outcome::Accepted(id),
            None => {
                debug!("no contact matches the email address");
                Outcome::Unidentified
            }
        })
    }

    /// Every contact of the administration, undecorated.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn list_contacts(&self) -> Result<ResponseEnvelope> {
        self.get(CONTACTS, Params::new())
    }
}
