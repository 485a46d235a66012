//! Sales invoices and credit invoices
//!
//! Creation and delivery are separate requests. A created invoice is never
//! rolled back: when the send request comes back error-shaped the invoice id
//! is still returned and only a warning is logged.

use moneybird_core::Transport;
use moneybird_domain::{
    DeliveryMethod, HttpMethod, InvoiceSending, Outcome, Params, ResponseEnvelope, Result,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::administration::{parse_id, AdministrationScope};

const SALES_INVOICES: &str = "sales_invoices";

impl<T: Transport> AdministrationScope<'_, T> {
    /// Full sales invoice.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn get_invoice(&self, invoice_id: &str) -> Result<Value> {
        Ok(self.get(&format!("{SALES_INVOICES}/{invoice_id}"), Params::new())?.into_body())
    }

    /// Create a sales invoice and deliver it unless `delivery` is
    /// [`DeliveryMethod::Concept`].
    ///
    /// `email_address` and `invoice_date` of the payload are copied into the
    /// send request.
    ///
    /// # Errors
    /// Transport and HTTP errors of either request.
    pub fn create_invoice<P: Serialize + ?Sized>(
        &self,
        invoice: &P,
        delivery: &DeliveryMethod,
        deliver_ubl: bool,
    ) -> Result<Outcome<u64>> {
        let attributes = serde_json::to_value(invoice)?;
        let response = self.write(HttpMethod::Post, SALES_INVOICES, "sales_invoice", &attributes)?;

        if let Some(reason) = response.error_message() {
            warn!(%reason, "sales invoice creation rejected");
            return Ok(Outcome::Rejected(reason));
        }

        let Some(invoice_id) = parse_id(response.field("id")) else {
            warn!("sales invoice creation returned no id");
            return Ok(Outcome::Unidentified);
        };
        info!(invoice_id, delivery = %delivery.as_str(), "sales invoice created");

        if !delivery.is_concept() {
            let mut sending = InvoiceSending::immediate(delivery, deliver_ubl);
            sending.email_address = present(attributes.get("email_address"));
            sending.invoice_date = present(attributes.get("invoice_date"));

            let sent = self.send_invoice(invoice_id, &sending)?;
            if let Some(reason) = sent.error_message() {
                warn!(invoice_id, %reason, "sales invoice created but sending was rejected");
            }
        }

        Ok(Outcome::Accepted(invoice_id))
    }

    /// Duplicate an invoice as a credit invoice, then optionally record the
    /// refund reference and deliver it.
    ///
    /// Returns `Rejected` when the last follow-up request comes back
    /// error-shaped.
    ///
    /// # Errors
    /// Transport and HTTP errors of any request.
    pub fn create_credit_invoice(
        &self,
        invoice_id: &str,
        delivery: &DeliveryMethod,
        deliver_ubl: bool,
        refund_reference: Option<&str>,
    ) -> Result<Outcome<u64>> {
        let response = self.touch(
            HttpMethod::Patch,
            &format!("{SALES_INVOICES}/{invoice_id}/duplicate_creditinvoice"),
        )?;

        if let Some(reason) = response.error_message() {
            warn!(%invoice_id, %reason, "credit invoice creation rejected");
            return Ok(Outcome::Rejected(reason));
        }

        let Some(credit_id) = parse_id(response.field("id")) else {
            warn!(%invoice_id, "credit invoice creation returned no id");
            return Ok(Outcome::Unidentified);
        };
        info!(%invoice_id, credit_id, "credit invoice created");

        let mut last_followup: Option<ResponseEnvelope> = None;

        if let Some(reference) = refund_reference.filter(|reference| !reference.is_empty()) {
            last_followup = Some(self.write(
                HttpMethod::Patch,
                &format!("{SALES_INVOICES}/{credit_id}"),
                "sales_invoice",
                &json!({ "reference": reference }),
            )?);
        }

        if !delivery.is_concept() {
            let sending = InvoiceSending::immediate(delivery, deliver_ubl);
            last_followup = Some(self.send_invoice(credit_id, &sending)?);
        }

        if let Some(reason) = last_followup.as_ref().and_then(ResponseEnvelope::error_message) {
            warn!(credit_id, %reason, "credit invoice follow-up rejected");
            return Ok(Outcome::Rejected(reason));
        }

        Ok(Outcome::Accepted(credit_id))
    }

    fn send_invoice(&self, invoice_id: u64, sending: &InvoiceSending) -> Result<ResponseEnvelope> {
        debug!(invoice_id, delivery = %sending.delivery_method, "sending sales invoice");
        self.write(
            HttpMethod::Patch,
            &format!("{SALES_INVOICES}/{invoice_id}/send_invoice"),
            "sales_invoice_sending",
            sending,
        )
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| !value.is_null()).cloned()
}
