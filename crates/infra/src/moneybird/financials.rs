use moneybird_core::Transport;
use moneybird_domain::constants::FINANCIAL_MUTATIONS_FILTER;
use moneybird_domain::{HttpMethod, Params, ResponseEnvelope, Result};
use serde::Serialize;

use super::administration::AdministrationScope;

impl<T: Transport> AdministrationScope<'_, T> {
    /// # Errors
    /// Transport and HTTP errors.
    pub fn financial_accounts(&self) -> Result<ResponseEnvelope> {
        self.get("financial_accounts", Params::new())
    }

    /// Import a financial statement (bank mutations).
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn add_financial_statement<P: Serialize + ?Sized>(
        &self,
        statement: &P,
    ) -> Result<ResponseEnvelope> {
        self.write(HttpMethod::Post, "financial_statements", "financial_statement", statement)
    }

    /// Unprocessed mutations of the current year.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn financial_mutations(&self) -> Result<ResponseEnvelope> {
        self.get("financial_mutations", Params::new().with("filter", FINANCIAL_MUTATIONS_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use moneybird_core::RequestBody;
    use moneybird_domain::{Headers, HttpMethod, MoneybirdError};
    use serde_json::json;

    use crate::moneybird::test_support::{executor, scope_over};
    use crate::testing::ScriptedTransport;

    #[test]
    fn mutations_use_the_unprocessed_filter() {
        let exec = executor(ScriptedTransport::new().respond_json(200, json!([])));
        scope_over(&exec).financial_mutations().unwrap();

        assert_eq!(
            exec.transport().urls(),
            vec![
                "https://moneybird.com/api/v2/42/financial_mutations.json?filter=period%3Athis_year%2Cstate%3Aunprocessed"
                    .to_string()
            ]
        );
    }

    #[test]
    fn statement_is_posted_under_its_resource_key() {
        let exec = executor(ScriptedTransport::new().respond_json(201, json!({"id": "8"})));
        let envelope = scope_over(&exec)
            .add_financial_statement(&json!({"financial_account_id": "3", "reference": "stmt"}))
            .unwrap();

        assert_eq!(envelope.field("id"), Some(&json!("8")));
        let sent = exec.transport().last_request().unwrap();
        assert_eq!(sent.method, Some(HttpMethod::Post));
        let Some(RequestBody::Json(raw)) = sent.body else { panic!("expected JSON body") };
        assert!(raw.starts_with(r#"{"financial_statement":"#));
    }

    #[test]
    fn accounts_propagate_http_errors() {
        let exec = executor(ScriptedTransport::new().respond(401, Headers::new(), "unauthorized"));
        let err = scope_over(&exec).financial_accounts().unwrap_err();
        assert_eq!(err, MoneybirdError::HttpStatus { status: 401, body: "unauthorized".into() });
    }
}
