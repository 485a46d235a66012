use moneybird_core::Transport;
use moneybird_domain::{HttpMethod, PaymentRecord, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::administration::AdministrationScope;

/// Body of a payment registration.
#[derive(Serialize)]
struct PaymentAttributes<'a> {
    payment_date: &'a str,
    price: &'a str,
    price_base: &'a str,
    transaction_identifier: &'a str,
}

impl<'a> From<&'a PaymentRecord> for PaymentAttributes<'a> {
    fn from(payment: &'a PaymentRecord) -> Self {
        Self {
            payment_date: &payment.payment_date,
            price: &payment.amount,
            price_base: &payment.amount,
            transaction_identifier: &payment.transaction_identifier,
        }
    }
}

impl<T: Transport> AdministrationScope<'_, T> {
    /// Register a payment against a sales invoice.
    ///
    /// Returns `false` when the API answers with an error-shaped body.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn create_payment(&self, invoice_id: &str, payment: &PaymentRecord) -> Result<bool> {
        let response = self.write(
            HttpMethod::Post,
            &format!("sales_invoices/{invoice_id}/payments"),
            "payment",
            &PaymentAttributes::from(payment),
        )?;

        match response.error_message() {
            Some(reason) => {
                warn!(%invoice_id, %reason, "payment registration rejected");
                Ok(false)
            }
            None => {
                info!(%invoice_id, transaction = %payment.transaction_identifier, "payment registered");
                Ok(true)
            }
        }
    }

    /// Register an upstream payment if it belongs to a synced invoice.
    ///
    /// # Errors
    /// See [`Self::create_payment`].
    pub fn settle_payment(
        &self,
        synced_invoice_id: Option<&str>,
        payment: &PaymentRecord,
    ) -> Result<bool> {
        match synced_invoice_id.filter(|id| !id.is_empty()) {
            Some(invoice_id) => self.create_payment(invoice_id, payment),
            None => {
                debug!(transaction = %payment.transaction_identifier, "payment has no synced invoice");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use moneybird_core::RequestBody;
    use moneybird_domain::{MoneybirdError, PaymentRecord};
    use serde_json::{json, Value};

    use crate::moneybird::test_support::{executor, scope_over};
    use crate::testing::ScriptedTransport;

    fn payment() -> PaymentRecord {
        PaymentRecord {
            payment_date: "2026-02-01".into(),
            amount: "121.00".into(),
            transaction_identifier: "tr_abc".into(),
        }
    }

    #[test]
    fn payment_body_carries_date_amount_and_transaction() {
        let exec = executor(ScriptedTransport::new().respond_json(201, json!({"id": "1"})));
        assert!(scope_over(&exec).create_payment("300", &payment()).unwrap());

        let sent = exec.transport().last_request().unwrap();
        assert_eq!(
            sent.url.as_deref(),
            Some("https://moneybird.com/api/v2/42/sales_invoices/300/payments.json")
        );
        let Some(RequestBody::Json(raw)) = sent.body else { panic!("expected JSON body") };
        let body: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            body,
            json!({"payment": {
                "payment_date": "2026-02-01",
                "price": "121.00",
                "price_base": "121.00",
                "transaction_identifier": "tr_abc"
            }})
        );
    }

    #[test]
    fn error_body_reports_false() {
        let exec = executor(ScriptedTransport::new().respond_json(200, json!({"error": "paid"})));
        assert!(!scope_over(&exec).create_payment("300", &payment()).unwrap());
    }

    #[test]
    fn transport_failure_propagates() {
        let exec = executor(
            ScriptedTransport::new().fail(MoneybirdError::Transport { code: 28, message: "timeout".into() }),
        );
        let err = scope_over(&exec).create_payment("300", &payment()).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn unsynced_payment_is_skipped_without_a_request() {
        let exec = executor(ScriptedTransport::new());
        let scope = scope_over(&exec);

        assert!(!scope.settle_payment(None, &payment()).unwrap());
        assert!(!scope.settle_payment(Some(""), &payment()).unwrap());
        assert_eq!(exec.transport().request_count(), 0);
    }

    #[test]
    fn synced_payment_is_registered() {
        let exec = executor(ScriptedTransport::new().respond_json(201, json!({})));
        assert!(scope_over(&exec).settle_payment(Some("300"), &payment()).unwrap());
        assert_eq!(exec.transport().request_count(), 1);
    }
}
