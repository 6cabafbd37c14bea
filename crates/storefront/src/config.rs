//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `SHOPFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPFRONT_API_URL` - Backend API base URL (default: <http://localhost:8080/api>)
//! - `SHOPFRONT_API_TIMEOUT_SECS` - Backend request timeout (default: 10, at most 300)
//! - `SHOPFRONT_PAGE_SIZE` - Products per listing page (default: 12)
//! - `SHOPFRONT_DEFAULT_SHIPPING_ADDRESS` - Used when checkout leaves it blank
//! - `SHOPFRONT_DEFAULT_PAYMENT_METHOD` - Preselected at checkout (default: `CREDIT_CARD`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use shopfront_core::PaymentMethod;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_SHIPPING_ADDRESS: &str = "Default Address";

/// Longest accepted backend request timeout.
pub const MAX_API_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
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
    /// Backend API configuration
    pub api: ApiConfig,
    /// Products per listing page
    pub page_size: u32,
    /// Values used when the checkout form leaves fields out
    pub checkout: CheckoutDefaults,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join under it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Checkout defaults.
#[derive(Debug, Clone)]
pub struct CheckoutDefaults {
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            shipping_address: DEFAULT_SHIPPING_ADDRESS.to_string(),
            payment_method: PaymentMethod::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("SHOPFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SHOPFRONT_PORT", "3000")?;
        let base_url = get_required_env("SHOPFRONT_BASE_URL")?;
        let page_size = parse_env_or_default::<u32>("SHOPFRONT_PAGE_SIZE", "12")?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let api = ApiConfig::from_env()?;
        let checkout = CheckoutDefaults::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            page_size,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Configuration with default settings for everything but the URLs.
    ///
    /// Used when embedding the storefront (e.g. in tests) without reading
    /// the environment.
    #[must_use]
    pub fn with_api(base_url: impl Into<String>, api: ApiConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: base_url.into(),
            api,
            page_size: 12,
            checkout: CheckoutDefaults::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    /// Build an API configuration, normalizing the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL, or if `timeout` exceeds [`MAX_API_TIMEOUT`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout > MAX_API_TIMEOUT {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_API_TIMEOUT_SECS".to_string(),
                format!("must be at most {} seconds", MAX_API_TIMEOUT.as_secs()),
            ));
        }

        let invalid =
            |reason: String| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), reason);

        let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            timeout,
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL);
        let timeout_secs = parse_env_or_default::<u64>("SHOPFRONT_API_TIMEOUT_SECS", "10")?;
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }
}

impl CheckoutDefaults {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            shipping_address: get_env_or_default(
                "SHOPFRONT_DEFAULT_SHIPPING_ADDRESS",
                DEFAULT_SHIPPING_ADDRESS,
            ),
            payment_method: parse_env_or_default(
                "SHOPFRONT_DEFAULT_PAYMENT_METHOD",
                PaymentMethod::default().code(),
            )?,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig::with_api(
            "http://localhost:3000",
            ApiConfig::new(DEFAULT_API_URL, Duration::from_secs(10)).unwrap(),
        )
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = "https://shop.example.test".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let api = ApiConfig::new("http://localhost:8080/api", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(
            api.base_url.join("orders").unwrap().as_str(),
            "http://localhost:8080/api/orders"
        );
    }

    #[test]
    fn test_api_url_keeps_existing_slash() {
        let api = ApiConfig::new("https://backend.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url.as_str(), "https://backend.test/");
    }

    #[test]
    fn test_api_url_rejects_garbage() {
        let err = ApiConfig::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SHOPFRONT_API_URL"));
    }

    #[test]
    fn test_api_url_rejects_non_http_scheme() {
        assert!(ApiConfig::new("ftp://backend.test/api", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_api_timeout_is_bounded() {
        assert!(ApiConfig::new(DEFAULT_API_URL, MAX_API_TIMEOUT).is_ok());
        let err = ApiConfig::new(DEFAULT_API_URL, MAX_API_TIMEOUT + Duration::from_secs(1))
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SHOPFRONT_API_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_checkout_defaults() {
        let defaults = CheckoutDefaults::default();
        assert_eq!(defaults.shipping_address, "Default Address");
        assert_eq!(defaults.payment_method, PaymentMethod::CreditCard);
    }
}
