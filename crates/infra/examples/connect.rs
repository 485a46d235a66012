//! Example: Connecting a Moneybird administration
//!
//! Walks through the authorization handshake and lists the tax rates of the
//! connected administration.
//!
//! # Setup
//!
//! 1. Register an OAuth application with Moneybird and export its
//!    credentials: ```bash export MONEYBIRD_CLIENT_ID=...
//!    export MONEYBIRD_CLIENT_SECRET=...
//!    export MONEYBIRD_SESSION_FILE=/tmp/moneybird-session.json ```
//!
//! 2. Run the example once to get the authorization URL: ```bash cargo run
//!    --example connect ```
//!
//! 3. Open the URL, approve, and run again with the `code` and `mb_oauth2`
//!    values of the redirect: ```bash cargo run --example connect -- <code>
//!    <nonce> ```

use moneybird_domain::AuthStage;
use moneybird_infra::{config, MoneybirdClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::load()?;
    let mut client = MoneybirdClient::from_config(config)?;

    let mut args = std::env::args().skip(1);
    let stage = match (args.next(), args.next()) {
        (Some(code), Some(nonce)) => client.handle_redirect(&code, &nonce)?,
        _ => client.init()?,
    };

    if stage != AuthStage::Verified {
        println!("Authorize the application at:");
        println!("  {}", client.authorization_url().unwrap_or("<no pending authorization>"));
        return Ok(());
    }

    let scope = client.administration()?;
    println!("Connected to administration {}", scope.administration_id());
    for (id, name) in scope.tax_rates()? {
        println!("  {id}: {name}");
    }

    Ok(())
}
