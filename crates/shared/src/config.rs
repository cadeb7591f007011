//! Application configuration management.
//!
//! Configuration is constructed once at startup and handed to each component;
//! nothing reads it from a global.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// SMTP configuration for notifications.
    #[serde(default)]
    pub email: EmailConfig,
    /// Payment provider configuration.
    pub payment: PaymentConfig,
    /// Compliance and settlement tuning.
    #[serde(default)]
    pub compliance: ComplianceConfig,
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

/// JWT validation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// SMTP configuration.
///
/// When `enabled` is false, notifications are only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether outbound SMTP delivery is active.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Talk to the relay without TLS, for a local mail catcher. No
    /// credentials are sent in this mode.
    #[serde(default)]
    pub allow_plaintext: bool,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_email() -> String {
    "info@regrouter.com".to_string()
}

fn default_from_name() -> String {
    "Reg-Router".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            allow_plaintext: false,
        }
    }
}

/// Payment provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider API base URL.
    #[serde(default = "default_payment_base_url")]
    pub api_base_url: String,
    /// Provider secret API key.
    pub secret_key: String,
    /// Shared secret used to sign webhook deliveries.
    pub webhook_secret: String,
    /// Settlement currency for holds.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Timeout for any single provider call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum accepted age of a webhook signature, in seconds.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

fn default_payment_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_request_timeout() -> u64 {
    10
}

fn default_webhook_tolerance() -> i64 {
    300
}

impl PaymentConfig {
    /// Returns the provider call timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// What to do with a cancellation when the refund call fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundPolicy {
    /// Leave the entry untouched and report the refund error.
    #[default]
    RequireRefund,
    /// Cancel the entry anyway, then report the refund error.
    CancelRegardless,
}

/// Compliance and settlement tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceConfig {
    /// Fee billed for every compliance pass.
    #[serde(default = "default_validation_fee")]
    pub validation_fee: Decimal,
    /// Delay before the background settlement task runs, in seconds.
    #[serde(default = "default_settlement_delay")]
    pub settlement_delay_secs: u64,
    /// Timeout for the refund call during cancellation, in seconds.
    #[serde(default = "default_refund_timeout")]
    pub refund_timeout_secs: u64,
    /// Cancellation behaviour when the refund fails.
    #[serde(default)]
    pub refund_policy: RefundPolicy,
    /// How long an admin accreditation verification stays valid, in days.
    #[serde(default = "default_accreditation_validity")]
    pub accreditation_validity_days: i64,
}

fn default_validation_fee() -> Decimal {
    Decimal::new(200, 2)
}

fn default_settlement_delay() -> u64 {
    10
}

fn default_refund_timeout() -> u64 {
    10
}

fn default_accreditation_validity() -> i64 {
    90
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            validation_fee: default_validation_fee(),
            settlement_delay_secs: default_settlement_delay(),
            refund_timeout_secs: default_refund_timeout(),
            refund_policy: RefundPolicy::default(),
            accreditation_validity_days: default_accreditation_validity(),
        }
    }
}

impl ComplianceConfig {
    /// Returns the delayed-settlement wait.
    #[must_use]
    pub const fn settlement_delay(&self) -> Duration {
        Duration::from_secs(self.settlement_delay_secs)
    }

    /// Returns the refund call timeout.
    #[must_use]
    pub const fn refund_timeout(&self) -> Duration {
        Duration::from_secs(self.refund_timeout_secs)
    }

    /// Returns the accreditation validity window.
    #[must_use]
    pub fn accreditation_validity(&self) -> chrono::Duration {
        chrono::Duration::days(self.accreditation_validity_days)
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
            .add_source(config::Environment::with_prefix("REGROUTER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_defaults() {
        let config = ComplianceConfig::default();
        assert_eq!(config.validation_fee, Decimal::new(200, 2));
        assert_eq!(config.settlement_delay(), Duration::from_secs(10));
        assert_eq!(config.refund_policy, RefundPolicy::RequireRefund);
        assert_eq!(config.accreditation_validity(), chrono::Duration::days(90));
    }

    #[test]
    fn test_email_config_default_is_log_only() {
        let config = EmailConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 465);
        assert!(!config.allow_plaintext);
    }

    #[test]
    fn test_refund_policy_deserialize() {
        let policy: RefundPolicy = serde_json::from_str("\"cancel_regardless\"").unwrap();
        assert_eq!(policy, RefundPolicy::CancelRegardless);
        let policy: RefundPolicy = serde_json::from_str("\"require_refund\"").unwrap();
        assert_eq!(policy, RefundPolicy::RequireRefund);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("REGROUTER__SERVER__PORT", Some("9090")),
                ("REGROUTER__DATABASE__URL", Some("postgres://localhost/regrouter")),
                ("REGROUTER__JWT__SECRET", Some("secret")),
                ("REGROUTER__PAYMENT__SECRET_KEY", Some("sk_test")),
                ("REGROUTER__PAYMENT__WEBHOOK_SECRET", Some("whsec_test")),
                ("REGROUTER__COMPLIANCE__REFUND_POLICY", Some("cancel_regardless")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.database.url, "postgres://localhost/regrouter");
                assert_eq!(config.payment.secret_key, "sk_test");
                assert_eq!(config.payment.currency, Currency::Usd);
                assert_eq!(
                    config.compliance.refund_policy,
                    RefundPolicy::CancelRegardless
                );
            },
        );
    }
}
