//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If credentials are missing there, falls back to a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `POSTKIT_CLIENT_ID`, `POSTKIT_CLIENT_SECRET`: credentials (required)
//! - `POSTKIT_ENVIRONMENT`: `production` or `testing`
//! - `POSTKIT_BASE_URL`, `POSTKIT_OAUTH_BASE_URL`: base URL overrides
//! - `POSTKIT_TIMEOUT_SECS`: per-request timeout
//! - `POSTKIT_SCOPES`: space separated OAuth scopes
//! - `POSTKIT_TOKEN_REFRESH_BUFFER_SECS`: refresh this long before expiry
//! - `POSTKIT_USE_REFRESH_TOKENS`: `true`/`false`
//! - `POSTKIT_BULK_MAX_CONCURRENCY`, `POSTKIT_BULK_REQUESTS_PER_SECOND`,
//!   `POSTKIT_BULK_MAX_RETRIES`, `POSTKIT_BULK_RETRY_BACKOFF_MS`
//!
//! ## File Locations
//! The loader probes `./postkit.{toml,json}` then `./config.{toml,json}`
//! in the current working directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use postkit_domain::{BulkConfig, ClientConfig, Environment, PostalError, Result};
use serde::Deserialize;

const CONFIG_FILE_NAMES: [&str; 4] = ["postkit.toml", "postkit.json", "config.toml", "config.json"];

/// Settings as they appear in a file or the environment, before defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    environment: Option<String>,
    base_url: Option<String>,
    oauth_base_url: Option<String>,
    timeout_secs: Option<u64>,
    scopes: Option<Vec<String>>,
    token_refresh_buffer_secs: Option<u64>,
    use_refresh_tokens: Option<bool>,
    bulk: RawBulkConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBulkConfig {
    max_concurrency: Option<usize>,
    requests_per_second: Option<u32>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

impl RawConfig {
    fn into_client_config(self) -> Result<ClientConfig> {
        let client_id = self.client_id.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
            PostalError::Config("Missing required setting: client_id".to_string())
        })?;
        let client_secret =
            self.client_secret.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                PostalError::Config("Missing required setting: client_secret".to_string())
            })?;

        let mut builder = ClientConfig::builder(client_id, client_secret);
        if let Some(environment) = self.environment {
            let environment = Environment::from_str(&environment)
                .map_err(|e| PostalError::Config(format!("Invalid environment: {e}")))?;
            builder = builder.environment(environment);
        }
        if let Some(url) = self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(url) = self.oauth_base_url {
            builder = builder.oauth_base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(scopes) = self.scopes {
            builder = builder.scopes(scopes);
        }
        if let Some(secs) = self.token_refresh_buffer_secs {
            builder = builder.token_refresh_buffer(Duration::from_secs(secs));
        }
        if let Some(enabled) = self.use_refresh_tokens {
            builder = builder.use_refresh_tokens(enabled);
        }

        let mut bulk = BulkConfig::default();
        if let Some(value) = self.bulk.max_concurrency {
            bulk = bulk.with_max_concurrency(value);
        }
        if let Some(value) = self.bulk.requests_per_second {
            bulk = bulk.with_requests_per_second(value);
        }
        if let Some(value) = self.bulk.max_retries {
            bulk = bulk.with_max_retries(value);
        }
        if let Some(ms) = self.bulk.retry_backoff_ms {
            bulk = bulk.with_retry_backoff(Duration::from_millis(ms));
        }

        builder.bulk(bulk).build()
    }
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading a
/// `.env` file if present). Falls back to a config file only when the
/// credential variables are not set; an invalid environment value is
/// reported rather than masked by the file.
///
/// # Errors
/// Returns `PostalError::Config` if configuration cannot be loaded from
/// the chosen source or is invalid.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    load_with(|key| std::env::var(key).ok(), || load_from_file(None))
}

fn load_with<F, L>(lookup: F, from_file: L) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
    L: FnOnce() -> Result<ClientConfig>,
{
    if credentials_missing(&lookup) {
        tracing::debug!("Credentials not set in environment, trying file");
        return from_file();
    }

    let config = load_from_lookup(lookup)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

fn credentials_missing<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    ["POSTKIT_CLIENT_ID", "POSTKIT_CLIENT_SECRET"]
        .iter()
        .any(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
}

/// Load configuration from the process environment
///
/// # Errors
/// Returns `PostalError::Config` if required variables are missing or any
/// value is invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary variable lookup
///
/// `lookup` receives the full variable name (for example
/// `POSTKIT_CLIENT_ID`). Tests pass a map here instead of touching the
/// process environment.
///
/// # Errors
/// Returns `PostalError::Config` if required variables are missing or any
/// value is invalid.
pub fn load_from_lookup<F>(lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let raw = RawConfig {
        client_id: Some(required(&get, "POSTKIT_CLIENT_ID")?),
        client_secret: Some(required(&get, "POSTKIT_CLIENT_SECRET")?),
        environment: get("POSTKIT_ENVIRONMENT"),
        base_url: get("POSTKIT_BASE_URL"),
        oauth_base_url: get("POSTKIT_OAUTH_BASE_URL"),
        timeout_secs: parse_var(&get, "POSTKIT_TIMEOUT_SECS")?,
        scopes: get("POSTKIT_SCOPES")
            .map(|s| s.split_whitespace().map(str::to_string).collect()),
        token_refresh_buffer_secs: parse_var(&get, "POSTKIT_TOKEN_REFRESH_BUFFER_SECS")?,
        use_refresh_tokens: get("POSTKIT_USE_REFRESH_TOKENS")
            .map(|s| parse_bool("POSTKIT_USE_REFRESH_TOKENS", &s))
            .transpose()?,
        bulk: RawBulkConfig {
            max_concurrency: parse_var(&get, "POSTKIT_BULK_MAX_CONCURRENCY")?,
            requests_per_second: parse_var(&get, "POSTKIT_BULK_REQUESTS_PER_SECOND")?,
            max_retries: parse_var(&get, "POSTKIT_BULK_MAX_RETRIES")?,
            retry_backoff_ms: parse_var(&get, "POSTKIT_BULK_RETRY_BACKOFF_MS")?,
        },
    };
    raw.into_client_config()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PostalError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PostalError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PostalError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PostalError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let raw: RawConfig = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PostalError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| PostalError::Config(format!("Invalid JSON format: {e}")))?,
        _ => return Err(PostalError::Config(format!("Unsupported config format: {extension}"))),
    };
    raw.into_client_config()
}

/// Probe the working directory for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_in(&cwd)
}

fn probe_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.exists())
}

fn required<G>(get: &G, key: &str) -> Result<String>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| {
        PostalError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn parse_var<G, T>(get: &G, key: &str) -> Result<Option<T>>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| PostalError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PostalError::Config(format!("Invalid boolean for {key}: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_bool_parsing() {
        for value in ["1", "true", "YES", "On"] {
            assert!(parse_bool("K", value).unwrap());
        }
        for value in ["0", "false", "no", "OFF"] {
            assert!(!parse_bool("K", value).unwrap());
        }
        assert!(parse_bool("K", "maybe").is_err());
    }

    #[test]
    fn test_load_from_lookup_all_vars_set() {
        let config = load_from_lookup(lookup(&[
            ("POSTKIT_CLIENT_ID", "id"),
            ("POSTKIT_CLIENT_SECRET", "secret"),
            ("POSTKIT_ENVIRONMENT", "testing"),
            ("POSTKIT_TIMEOUT_SECS", "12"),
            ("POSTKIT_SCOPES", "addresses  tracking"),
            ("POSTKIT_TOKEN_REFRESH_BUFFER_SECS", "60"),
            ("POSTKIT_USE_REFRESH_TOKENS", "yes"),
            ("POSTKIT_BULK_MAX_CONCURRENCY", "3"),
            ("POSTKIT_BULK_REQUESTS_PER_SECOND", "7"),
            ("POSTKIT_BULK_MAX_RETRIES", "1"),
            ("POSTKIT_BULK_RETRY_BACKOFF_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Testing);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.scopes, vec!["addresses", "tracking"]);
        assert_eq!(config.token_refresh_buffer, Duration::from_secs(60));
        assert!(config.use_refresh_tokens);
        assert_eq!(config.bulk.max_concurrency, 3);
        assert_eq!(config.bulk.requests_per_second, 7);
        assert_eq!(config.bulk.max_retries, 1);
        assert_eq!(config.bulk.retry_backoff, Duration::from_millis(250));
        assert_eq!(config.api_base_url(), "https://apis-tem.usps.com/addresses/v3");
    }

    #[test]
    fn test_load_from_lookup_missing_secret() {
        let err = load_from_lookup(lookup(&[("POSTKIT_CLIENT_ID", "id")])).unwrap_err();
        assert!(
            matches!(err, PostalError::Config(ref msg) if msg.contains("POSTKIT_CLIENT_SECRET"))
        );
    }

    #[test]
    fn test_load_from_lookup_invalid_number() {
        let err = load_from_lookup(lookup(&[
            ("POSTKIT_CLIENT_ID", "id"),
            ("POSTKIT_CLIENT_SECRET", "secret"),
            ("POSTKIT_BULK_MAX_CONCURRENCY", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PostalError::Config(_)));
    }

    #[test]
    fn test_invalid_env_value_is_not_masked_by_file() {
        let err = load_with(
            lookup(&[
                ("POSTKIT_CLIENT_ID", "id"),
                ("POSTKIT_CLIENT_SECRET", "secret"),
                ("POSTKIT_BULK_MAX_CONCURRENCY", "abc"),
            ]),
            || panic!("file fallback must not run when credentials are set"),
        )
        .unwrap_err();
        let PostalError::Config(msg) = err else { panic!("expected config error") };
        assert!(msg.contains("POSTKIT_BULK_MAX_CONCURRENCY"), "{msg}");
    }

    #[test]
    fn test_missing_credentials_fall_back_to_file() {
        let from_file = || ClientConfig::builder("file-id", "file-secret").build();

        let config = load_with(lookup(&[]), from_file).unwrap();
        assert_eq!(config.client_id, "file-id");

        let config = load_with(
            lookup(&[("POSTKIT_CLIENT_ID", "id"), ("POSTKIT_CLIENT_SECRET", "  ")]),
            from_file,
        )
        .unwrap();
        assert_eq!(config.client_id, "file-id");
    }

    #[test]
    fn test_load_from_lookup_rejects_zero_rate() {
        let err = load_from_lookup(lookup(&[
            ("POSTKIT_CLIENT_ID", "id"),
            ("POSTKIT_CLIENT_SECRET", "secret"),
            ("POSTKIT_BULK_REQUESTS_PER_SECOND", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PostalError::Config(_)));
    }

    #[test]
    fn test_parse_config_formats() {
        let toml = r#"
client_id = "id"
client_secret = "secret"
use_refresh_tokens = true

[bulk]
max_concurrency = 2
"#;
        let config = parse_config(toml, Path::new("postkit.toml")).unwrap();
        assert!(config.use_refresh_tokens);
        assert_eq!(config.bulk.max_concurrency, 2);

        let json = r#"{"client_id": "id", "client_secret": "secret", "environment": "production"}"#;
        let config = parse_config(json, Path::new("postkit.json")).unwrap();
        assert_eq!(config.environment, Environment::Production);

        assert!(parse_config("x", Path::new("postkit.yaml")).is_err());
        assert!(parse_config("{", Path::new("postkit.json")).is_err());
    }

    #[test]
    fn test_probe_prefers_postkit_toml() {
        let dir = TempDir::new().unwrap();
        assert!(probe_in(dir.path()).is_none());

        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("postkit.toml"), "").unwrap();
        assert_eq!(probe_in(dir.path()), Some(dir.path().join("postkit.toml")));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/postkit.toml"))).unwrap_err();
        assert!(matches!(err, PostalError::Config(_)));
    }
}
