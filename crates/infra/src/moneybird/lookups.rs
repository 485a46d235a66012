//! Reference-data listings reduced to `id -> label` tables

use moneybird_core::Transport;
use moneybird_domain::constants::{
    INVOICE_WORKFLOW_TYPE, REVENUE_ACCOUNT_TYPE, SALES_INVOICE_TAX_RATE_TYPE,
};
use moneybird_domain::{LookupTable, Params, Result};
use serde_json::{Map, Value};
use tracing::debug;

use super::administration::{lookup_table, AdministrationScope};

impl<T: Transport> AdministrationScope<'_, T> {
    /// # Errors
    /// Transport and HTTP errors.
    pub fn custom_fields(&self) -> Result<LookupTable> {
        self.table("custom_fields", "name", |_| true)
    }

    /// Products keyed by id, labelled with their description.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn products(&self) -> Result<LookupTable> {
        self.table("products", "description", |_| true)
    }

    /// Active sales-invoice tax rates.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn tax_rates(&self) -> Result<LookupTable> {
        self.table("tax_rates", "name", |rate| {
            truthy(rate.get("active"))
                && rate.get("tax_rate_type").and_then(Value::as_str)
                    == Some(SALES_INVOICE_TAX_RATE_TYPE)
        })
    }

    /// Invoice workflows.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn workflows(&self) -> Result<LookupTable> {
        self.table("workflows", "name", |workflow| {
            workflow.get("type").and_then(Value::as_str) == Some(INVOICE_WORKFLOW_TYPE)
        })
    }

    /// Revenue ledger accounts.
    ///
    /// # Errors
    /// Transport and HTTP errors.
    pub fn categories(&self) -> Result<LookupTable> {
        self.table("ledger_accounts", "name", |account| {
            account.get("account_type").and_then(Value::as_str) == Some(REVENUE_ACCOUNT_TYPE)
        })
    }

    /// # Errors
    /// Transport and HTTP errors.
    pub fn document_styles(&self) -> Result<LookupTable> {
        self.table("document_styles", "name", |_| true)
    }

    fn table(
        &self,
        resource: &str,
        field: &str,
        keep: impl Fn(&Map<String, Value>) -> bool,
    ) -> Result<LookupTable> {
        let listing = self.get(resource, Params::new())?;
        let table = lookup_table(&listing, field, keep);
        debug!(resource, entries = table.len(), "lookup table built");
        Ok(table)
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty() && text != "0" && text != "false",
        _ => false,
    }
}
