//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Payment gateway configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Payment gateway configuration.
///
/// Without a `secret_key` the deployment runs with no payment capability and
/// every gateway route answers `GATEWAY_UNAVAILABLE`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    /// Gateway API secret key.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Gateway API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// ISO 4217 currency code, lowercase as the gateway expects it.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Flat application fee in minor units.
    #[serde(default = "default_application_fee")]
    pub application_fee_minor: i64,
    /// Upper bound for a single gateway call.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_application_fee() -> i64 {
    1000
}

fn default_gateway_timeout() -> u64 {
    10
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_base: default_api_base(),
            currency: default_currency(),
            application_fee_minor: default_application_fee(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl PaymentsConfig {
    /// Returns the secret key when one is configured and non-blank.
    #[must_use]
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MICROLOAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("MICROLOAN__SERVER__PORT", Some("9090")),
                ("MICROLOAN__DATABASE__URL", Some("postgres://localhost/microloan")),
                ("MICROLOAN__JWT__SECRET", Some("secret")),
                ("MICROLOAN__PAYMENTS__APPLICATION_FEE_MINOR", Some("2500")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.url, "postgres://localhost/microloan");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.payments.application_fee_minor, 2500);
                assert_eq!(config.payments.currency, "usd");
                assert!(config.payments.secret_key().is_none());
            },
        );
    }

    #[test]
    fn test_blank_secret_key_means_unconfigured() {
        let config = PaymentsConfig {
            secret_key: Some("   ".to_string()),
            ..PaymentsConfig::default()
        };
        assert!(config.secret_key().is_none());

        let config = PaymentsConfig {
            secret_key: Some("sk_test_123".to_string()),
            ..PaymentsConfig::default()
        };
        assert_eq!(config.secret_key(), Some("sk_test_123"));
    }
}
