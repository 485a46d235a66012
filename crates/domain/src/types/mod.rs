//! Domain types and models

pub mod http;
pub mod resources;
pub mod session;

pub use http::{
    ContentType, Headers, HttpMethod, Params, RawResponse, RequestSpec, ResponseEnvelope,
};
pub use resources::{
    Administration, DeliveryMethod, InvoiceSending, LookupTable, Outcome, PaymentRecord,
};
pub use session::{scalar_to_string, AuthStage, ClientCredentials, SessionState};
