//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! building a client from it.

use moneybird_domain::{AuthStage, MoneybirdError};
use moneybird_infra::{config, MoneybirdClient};
use tempfile::TempDir;

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("moneybird.json");
    std::fs::write(
        &path,
        r#"{
            "credentials": {
                "client_id": "A",
                "client_secret": "B",
                "redirect_uri": "https://shop.test/moneybird/callback"
            },
            "endpoints": {
                "site_url": "https://sandbox.moneybird.test",
                "api_url": "https://sandbox.moneybird.test/api/"
            },
            "transport": {
                "user_agent": "ShopSync/1.0",
                "verify_tls": true
            }
        }"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.credentials.client_id(), "A");
    assert_eq!(
        config.credentials.redirect_uri(),
        Some("https://shop.test/moneybird/callback")
    );
    assert_eq!(config.endpoints.versioned_root(), "https://sandbox.moneybird.test/api/v2");
    assert_eq!(config.endpoints.token_url, "https://moneybird.com/oauth/token");
    assert_eq!(config.transport.user_agent, "ShopSync/1.0");
    assert_eq!(config.transport.timeout_secs, 30);
    assert!(config.session_file.is_none());
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[credentials]
client_id = "A"
client_secret = "B"

[transport]
timeout_secs = 15
verify_tls = false
"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.transport.timeout_secs, 15);
    assert_eq!(config.transport.connect_timeout_secs, 30);
    assert!(!config.transport.verify_tls);
}

#[test]
fn test_missing_credentials_fail_to_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("moneybird.toml");
    std::fs::write(&path, "[transport]\ntimeout_secs = 15\n").expect("Failed to write config");

    let result = config::load_from_file(Some(path));
    assert!(matches!(result, Err(MoneybirdError::Config(_))));
}

#[test]
fn test_client_from_file_config_persists_session() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let session_path = dir.path().join("state").join("session.json");
    let config_path = dir.path().join("moneybird.toml");
    std::fs::write(
        &config_path,
        format!(
            "session_file = {:?}\n\n[credentials]\nclient_id = \"A\"\nclient_secret = \"B\"\n",
            session_path.display().to_string()
        ),
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(config_path)).expect("config should load");
    let mut client = MoneybirdClient::from_config(config.clone()).expect("client should build");

    let url = client.begin_authorization().expect("authorization url");
    assert!(url.contains("client_id=A"));
    assert_eq!(client.stage(), AuthStage::AwaitingRedirect);

    let reloaded = MoneybirdClient::from_config(config).expect("client should reload");
    assert_eq!(reloaded.stage(), AuthStage::AwaitingRedirect);
    assert_eq!(reloaded.authorization_url(), Some(url.as_str()));
}
