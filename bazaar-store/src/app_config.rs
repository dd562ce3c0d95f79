use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub resiliency: ResiliencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a URL the API runs on the in-memory store.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Flat shipping rate, in minor units.
    pub shipping_price_minor: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    #[serde(default)]
    pub mock: bool,
    pub base_url: String,
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub key_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResiliencyConfig {
    pub payment_failure_threshold: usize,
    pub payment_reset_seconds: u64,
}

impl Default for ResiliencyConfig {
    fn default() -> Self {
        Self {
            payment_failure_threshold: 5,
            payment_reset_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment overlay, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local, untracked overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `BAZAAR__PAYMENT__KEY_SECRET=...` sets `payment.key_secret`
            .add_source(config::Environment::with_prefix("BAZAAR").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let raw = r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "secret"

            [business_rules]
            shipping_price_minor = 1000

            [payment]
            mock = true
            base_url = "https://api.razorpay.com"
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.business_rules.currency, "INR");
        assert_eq!(config.payment.timeout_ms, 10_000);
        assert_eq!(config.resiliency.payment_failure_threshold, 5);
    }
}
