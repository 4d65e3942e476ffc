use chrono::Duration;
use config::{Config, Environment, File, FileFormat};
use secrecy::Secret;
use serde::Deserialize;

use taraba_application::{
    AccessConfig, CodeConfig, HasherConfig, LimiterPolicy, RateLimitConfig, TokenConfig,
};

use crate::config::constants::env::CONFIG_FILE_ENV_VAR;

/// Deserialized settings for the whole access layer. Everything except the
/// signing key has a default; the signing key must come from the
/// environment or the config file, and a missing key is fatal at load.
#[derive(Debug, Deserialize)]
pub struct AccessSettings {
    pub token: TokenSettings,
    pub hashing: HashingSettings,
    pub verification: VerificationSettings,
    pub rate_limits: RateLimitSettings,
}

#[derive(Debug, Deserialize)]
pub struct TokenSettings {
    pub signing_key: Secret<String>,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct HashingSettings {
    pub min_secret_length: usize,
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize)]
pub struct VerificationSettings {
    pub code_ttl_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct PolicySettings {
    pub threshold: u32,
    pub window_seconds: i64,
    pub lockout_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitSettings {
    pub login: PolicySettings,
    pub code_issue: PolicySettings,
    pub code_confirm: PolicySettings,
}

impl AccessSettings {
    /// Load settings from defaults, an optional JSON file named by
    /// `TARABA_ACCESS_CONFIG`, and `TARABA__`-prefixed environment
    /// variables, in increasing precedence.
    ///
    /// # Panics
    /// Panics when no signing key is configured or a value fails to parse;
    /// the process must not come up without a usable configuration.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("token.issuer", "taraba-marketplace")
            .expect("default is valid")
            .set_default("token.audience", "taraba-admin")
            .expect("default is valid")
            .set_default("token.access_ttl_seconds", 8 * 3600)
            .expect("default is valid")
            .set_default("token.refresh_ttl_seconds", 7 * 86400)
            .expect("default is valid")
            .set_default("hashing.min_secret_length", 8)
            .expect("default is valid")
            .set_default("hashing.memory_cost_kib", 15000)
            .expect("default is valid")
            .set_default("hashing.time_cost", 2)
            .expect("default is valid")
            .set_default("hashing.parallelism", 1)
            .expect("default is valid")
            .set_default("verification.code_ttl_seconds", 600)
            .expect("default is valid")
            .set_default("rate_limits.login.threshold", 5)
            .expect("default is valid")
            .set_default("rate_limits.login.window_seconds", 3600)
            .expect("default is valid")
            .set_default("rate_limits.login.lockout_seconds", 1800)
            .expect("default is valid")
            .set_default("rate_limits.code_issue.threshold", 5)
            .expect("default is valid")
            .set_default("rate_limits.code_issue.window_seconds", 3600)
            .expect("default is valid")
            .set_default("rate_limits.code_issue.lockout_seconds", 3600)
            .expect("default is valid")
            .set_default("rate_limits.code_confirm.threshold", 5)
            .expect("default is valid")
            .set_default("rate_limits.code_confirm.window_seconds", 3600)
            .expect("default is valid")
            .set_default("rate_limits.code_confirm.lockout_seconds", 1800)
            .expect("default is valid");

        if let Ok(config_file) = std::env::var(CONFIG_FILE_ENV_VAR) {
            builder = builder.add_source(File::new(&config_file, FileFormat::Json));
        }

        builder
            .add_source(
                Environment::with_prefix("TARABA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .expect("Failed to assemble access configuration")
            .try_deserialize()
            .expect("Failed to load access settings; a signing key must be configured")
    }

    /// Convert into the typed component configs consumed by the
    /// orchestrator.
    pub fn into_config(self) -> AccessConfig {
        AccessConfig {
            hashing: HasherConfig {
                min_secret_length: self.hashing.min_secret_length,
                memory_cost_kib: self.hashing.memory_cost_kib,
                time_cost: self.hashing.time_cost,
                parallelism: self.hashing.parallelism,
            },
            codes: CodeConfig {
                ttl: Duration::seconds(self.verification.code_ttl_seconds),
            },
            rate_limits: RateLimitConfig {
                login: self.rate_limits.login.into_policy(),
                code_issue: self.rate_limits.code_issue.into_policy(),
                code_confirm: self.rate_limits.code_confirm.into_policy(),
            },
            tokens: TokenConfig {
                signing_key: self.token.signing_key,
                issuer: self.token.issuer,
                audience: self.token.audience,
                access_ttl: Duration::seconds(self.token.access_ttl_seconds),
                refresh_ttl: Duration::seconds(self.token.refresh_ttl_seconds),
            },
        }
    }
}

impl PolicySettings {
    fn into_policy(self) -> LimiterPolicy {
        LimiterPolicy {
            threshold: self.threshold,
            window: Duration::seconds(self.window_seconds),
            lockout: Duration::seconds(self.lockout_seconds),
        }
    }
}
