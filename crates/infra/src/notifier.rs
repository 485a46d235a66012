use moneybird_core::AuthorizationNotifier;
use tracing::warn;

/// Reports pending authorizations through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl AuthorizationNotifier for LogNotifier {
    fn authorization_required(&self, authorization_url: &str) {
        warn!(url = %authorization_url, "Moneybird authorization required; visit the URL to connect");
    }
}
