//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the hosted backend project
//! - `BACKEND_API_KEY` - Public (anon) API key, used for auth endpoints
//! - `BACKEND_SERVICE_KEY` - Service-role key for server-side table access
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `STOREFRONT_ALLOWED_ORIGIN` - SPA origin allowed by CORS
//! - `STOREFRONT_CURRENCY` - Catalogue currency code (default: NAD)
//! - `BACKEND_STORAGE_BUCKET` - Image bucket name (default: product-images)
//! - `WISHLIST_PATH` - Wishlist blob file path (default: data/wishlist.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use sockworks_core::CurrencyCode;

const MIN_SERVICE_KEY_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// SPA origin allowed by CORS, if any
    pub allowed_origin: Option<String>,
    /// Hosted backend configuration
    pub backend: BackendConfig,
    /// Path of the wishlist blob file
    pub wishlist_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project (e.g. <https://abc.example.io>)
    pub base_url: String,
    /// Public (anon) API key, safe to expose to browsers
    pub api_key: SecretString,
    /// Service-role key (server-side only)
    pub service_key: SecretString,
    /// Storage bucket for product images
    pub storage_bucket: String,
    /// Currency every catalogue price is denominated in
    pub currency: CurrencyCode,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("service_key", &"[REDACTED]")
            .field("storage_bucket", &self.storage_bucket)
            .field("currency", &self.currency)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service key fails validation (placeholder detection, length).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let allowed_origin = get_optional_env("STOREFRONT_ALLOWED_ORIGIN");
        let backend = BackendConfig::from_env()?;
        let wishlist_path =
            PathBuf::from(get_env_or_default("WISHLIST_PATH", "data/wishlist.json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            allowed_origin,
            backend,
            wishlist_path,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency_var = get_env_or_default("STOREFRONT_CURRENCY", "NAD");
        let currency = match currency_var.as_str() {
            "NAD" => CurrencyCode::NAD,
            "ZAR" => CurrencyCode::ZAR,
            "USD" => CurrencyCode::USD,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_CURRENCY".to_string(),
                    format!("unsupported currency: {other}"),
                ));
            }
        };

        let service_key = get_required_secret("BACKEND_SERVICE_KEY")?;
        validate_service_key(&service_key, "BACKEND_SERVICE_KEY")?;

        let base_url = get_required_env("BACKEND_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            api_key: get_required_secret("BACKEND_API_KEY")?,
            service_key,
            storage_bucket: get_env_or_default("BACKEND_STORAGE_BUCKET", "product-images"),
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the service key is not a placeholder and has a plausible
/// length for a real key.
fn validate_service_key(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_SERVICE_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SERVICE_KEY_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("looks like a placeholder (contains \"{pattern}\")"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_rejects_placeholders() {
        let secret = SecretString::from("your-service-key-goes-right-here-ok".to_string());
        assert!(matches!(
            validate_service_key(&secret, "BACKEND_SERVICE_KEY"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_service_key_rejects_short_values() {
        let secret = SecretString::from("abc123".to_string());
        assert!(matches!(
            validate_service_key(&secret, "BACKEND_SERVICE_KEY"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_service_key_accepts_plausible_keys() {
        let secret =
            SecretString::from("eyJhbGciOiJIUzI1NiJ9.c29ja3dvcmtzLXRlc3Qta2V5LW9r".to_string());
        assert!(validate_service_key(&secret, "BACKEND_SERVICE_KEY").is_ok());
    }

    #[test]
    fn test_backend_config_debug_redacts_keys() {
        let config = BackendConfig {
            base_url: "https://backend.test".to_string(),
            api_key: SecretString::from("anon-key-value".to_string()),
            service_key: SecretString::from("sk-sensitive-value".to_string()),
            storage_bucket: "product-images".to_string(),
            currency: CurrencyCode::NAD,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-sensitive-value"));
    }
}
