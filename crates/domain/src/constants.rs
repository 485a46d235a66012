//! Client constants
//!
//! Endpoints, fixed protocol values and transport defaults.

// Endpoints
pub const DEFAULT_SITE_URL: &str = "https://moneybird.com";
pub const DEFAULT_API_URL: &str = "https://moneybird.com/api/";
pub const DEFAULT_API_VERSION: &str = "v2";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://moneybird.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://moneybird.com/oauth/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost/callback";

// OAuth
pub const OAUTH_SCOPES: [&str; 2] = ["sales_invoices", "bank"];
pub const OAUTH_RESPONSE_TYPE: &str = "code";
pub const OAUTH_GRANT_TYPE: &str = "authorization_code";
/// Query parameter of the redirect URI that carries the handshake nonce.
pub const NONCE_PARAM: &str = "mb_oauth2";
pub const NONCE_BYTES: usize = 16;

// Transport defaults
pub const DEFAULT_USER_AGENT: &str = "MoneybirdClient";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reserved params key carrying a pre-serialized JSON body.
pub const JSON_BODY_KEY: &str = "JSON";

// Resources
pub const RESOURCE_SUFFIX: &str = ".json";
pub const FINANCIAL_MUTATIONS_FILTER: &str = "period:this_year,state:unprocessed";
pub const DELIVERY_METHOD_CONCEPT: &str = "Concept";
pub const INVOICE_WORKFLOW_TYPE: &str = "InvoiceWorkflow";
pub const REVENUE_ACCOUNT_TYPE: &str = "revenue";
pub const SALES_INVOICE_TAX_RATE_TYPE: &str = "sales_invoice";
