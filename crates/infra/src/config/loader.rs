//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MONEYBIRD_CLIENT_ID`: OAuth client id (required)
//! - `MONEYBIRD_CLIENT_SECRET`: OAuth client secret (required)
//! - `MONEYBIRD_REDIRECT_URI`: Redirect URI registered with the client
//! - `MONEYBIRD_API_URL`: Site base URL; every endpoint is derived from it
//! - `MONEYBIRD_SESSION_FILE`: JSON file the session is persisted to
//! - `MONEYBIRD_VERIFY_TLS`: Whether certificates are verified (true/false)
//! - `MONEYBIRD_TIMEOUT_SECS`: Total request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./moneybird.json` or `./moneybird.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use moneybird_domain::{ApiEndpoints, ClientConfig, ClientCredentials, MoneybirdError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["moneybird.json", "moneybird.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the credentials
/// are not set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `MoneybirdError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Credentials are missing or blank
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `MoneybirdError::Config` if the client id or secret is missing,
/// or an optional variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let client_id = env_var("MONEYBIRD_CLIENT_ID")?;
    let client_secret = env_var("MONEYBIRD_CLIENT_SECRET")?;
    let redirect_uri = std::env::var("MONEYBIRD_REDIRECT_URI").ok();

    let mut config =
        ClientConfig::new(ClientCredentials::new(client_id, client_secret, redirect_uri)?);

    if let Some(url) = env_opt("MONEYBIRD_API_URL") {
        config.endpoints = ApiEndpoints::for_host(&url);
    }

    config.session_file = env_opt("MONEYBIRD_SESSION_FILE").map(PathBuf::from);
    config.transport.verify_tls = env_bool("MONEYBIRD_VERIFY_TLS", config.transport.verify_tls);

    if let Some(timeout) = env_opt("MONEYBIRD_TIMEOUT_SECS") {
        config.transport.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| MoneybirdError::Config(format!("Invalid timeout: {e}")))?;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is
/// detected by file extension.
///
/// # Errors
/// Returns `MoneybirdError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Credentials are missing or blank
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MoneybirdError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MoneybirdError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MoneybirdError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, choosing the format by the
/// extension of `path`.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MoneybirdError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MoneybirdError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MoneybirdError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    first_existing(&dirs)
}

fn first_existing(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Get required environment variable
///
/// # Errors
/// Returns `MoneybirdError::Config` if the variable is unset or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        MoneybirdError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 7] = [
        "MONEYBIRD_CLIENT_ID",
        "MONEYBIRD_CLIENT_SECRET",
        "MONEYBIRD_REDIRECT_URI",
        "MONEYBIRD_API_URL",
        "MONEYBIRD_SESSION_FILE",
        "MONEYBIRD_VERIFY_TLS",
        "MONEYBIRD_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MB_TEST_BOOL_YES", "YES");
        std::env::set_var("MB_TEST_BOOL_OFF", "off");

        assert!(env_bool("MB_TEST_BOOL_YES", false));
        assert!(!env_bool("MB_TEST_BOOL_OFF", true));

        std::env::remove_var("MB_TEST_BOOL_MISSING");
        assert!(env_bool("MB_TEST_BOOL_MISSING", true));

        std::env::remove_var("MB_TEST_BOOL_YES");
        std::env::remove_var("MB_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MONEYBIRD_CLIENT_ID", "A");
        std::env::set_var("MONEYBIRD_CLIENT_SECRET", "B");
        std::env::set_var("MONEYBIRD_REDIRECT_URI", "https://shop.test/callback");
        std::env::set_var("MONEYBIRD_API_URL", "http://127.0.0.1:9000");
        std::env::set_var("MONEYBIRD_SESSION_FILE", "/tmp/moneybird-session.json");
        std::env::set_var("MONEYBIRD_VERIFY_TLS", "false");
        std::env::set_var("MONEYBIRD_TIMEOUT_SECS", "10");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.credentials.client_id(), "A");
        assert_eq!(config.credentials.redirect_uri(), Some("https://shop.test/callback"));
        assert_eq!(config.endpoints.token_url, "http://127.0.0.1:9000/oauth/token");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/moneybird-session.json")));
        assert!(!config.transport.verify_tls);
        assert_eq!(config.transport.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_env_missing_secret() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MONEYBIRD_CLIENT_ID", "A");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(MoneybirdError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MONEYBIRD_CLIENT_ID", "A");
        std::env::set_var("MONEYBIRD_CLIENT_SECRET", "B");
        std::env::set_var("MONEYBIRD_TIMEOUT_SECS", "soon");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(MoneybirdError::Config(msg)) if msg.starts_with("Invalid timeout")));
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "moneybird.json",
            r#"{
                "credentials": {"client_id": "A", "client_secret": "B"},
                "transport": {"timeout_secs": 12}
            }"#,
        );

        let config = load_from_file(Some(path)).expect("config from JSON");
        assert_eq!(config.credentials.client_secret(), "B");
        assert_eq!(config.transport.timeout_secs, 12);
        assert_eq!(config.transport.connect_timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "moneybird.toml",
            r#"
session_file = "/var/lib/shop/moneybird.json"

[credentials]
client_id = "A"
client_secret = "B"
redirect_uri = "https://shop.test/callback"

[endpoints]
version = "v3"
"#,
        );

        let config = load_from_file(Some(path)).expect("config from TOML");
        assert_eq!(config.endpoints.version, "v3");
        assert_eq!(config.endpoints.site_url, "https://moneybird.com");
        assert_eq!(config.session_file, Some(PathBuf::from("/var/lib/shop/moneybird.json")));
    }

    #[test]
    fn test_load_from_file_blank_secret_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.json",
            r#"{"credentials": {"client_id": "A", "client_secret": " "}}"#,
        );
        assert!(matches!(load_from_file(Some(path)), Err(MoneybirdError::Config(_))));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/moneybird.json")));
        assert!(matches!(result, Err(MoneybirdError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("credentials: {}", Path::new("moneybird.yaml"));
        assert!(matches!(result, Err(MoneybirdError::Config(msg)) if msg.contains("yaml")));
    }

    #[test]
    fn test_probe_prefers_moneybird_over_config() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "config.toml", "");
        write_file(&dir, "moneybird.toml", "");

        let found = first_existing(&[dir.path().to_path_buf()]);
        assert_eq!(found, Some(dir.path().join("moneybird.toml")));
    }

    #[test]
    fn test_probe_finds_nothing_in_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(first_existing(&[dir.path().to_path_buf()]), None);
    }
}
