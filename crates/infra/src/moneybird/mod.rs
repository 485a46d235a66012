//! Moneybird API client
//!
//! [`MoneybirdClient`] owns the request executor and the authorization
//! manager. Administration-scoped operations hang off
//! [`AdministrationScope`], which can only be obtained once the session has
//! been verified:
//!
//! ```no_run
//! use moneybird_domain::{ClientConfig, ClientCredentials};
//! use moneybird_infra::moneybird::MoneybirdClient;
//!
//! # fn example() -> moneybird_domain::Result<()> {
//! let credentials = ClientCredentials::new("client-id", "client-secret", None)?;
//! let mut client = MoneybirdClient::from_config(ClientConfig::new(credentials))?;
//! client.init()?;
//!
//! let scope = client.administration()?;
//! let tax_rates = scope.tax_rates()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Soft failures
//!
//! Contact writes, contact lookup and invoice creation report a rejection
//! in the response body as [`moneybird_domain::Outcome`] instead of an
//! error. Contact creation and contact lookup also report failed requests
//! that way.

pub mod administration;
pub mod client;
mod contacts;
mod financials;
mod invoices;
mod lookups;
mod payments;

pub use administration::AdministrationScope;
pub use client::{DefaultClient, MoneybirdClient};
