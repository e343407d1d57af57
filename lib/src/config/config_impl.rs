// lib/src/config/config_impl.rs

use std::collections::HashMap;
use std::path::Path;

use ::config::{Config, Environment as EnvSource, File};
use chrono::Duration;
use chrono_tz::Tz;
use log::{debug, info, warn};

use crate::config::config_defaults::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::config::config_structs::{AppConfig, Environment};
use crate::errors::{Result, StorageError};
use crate::time_window::parse_timezone;

/// Plain environment variables honored alongside the `YIDESHARE_*` ones.
const WELL_KNOWN_ENV: &[(&str, &str)] = &[
    ("JWT_SECRET", "auth.jwt_secret"),
    ("JWT_EXPIRES_IN", "auth.jwt_expires_in"),
    ("CRON_SECRET", "auth.cron_secret"),
    ("YALIES_API_KEY", "auth.directory_api_key"),
    ("NEXTAUTH_URL", "base_url"),
    ("PORT", "server.port"),
];

impl AppConfig {
    /// Loads configuration from `.env`, an optional file and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(dotenv_path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", dotenv_path.display());
        }
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(path, env)
    }

    /// Layers built-in defaults, the config file (the given path, or an
    /// optional `yideshare.{toml,yaml,json}` in the working directory),
    /// `YIDESHARE_*` variables and finally the well-known variables.
    pub fn load_from(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder.add_source(File::from(path.to_path_buf()))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(env.clone())),
        );

        for (var, key) in WELL_KNOWN_ENV {
            let value = env.get(*var).filter(|v| !v.trim().is_empty()).cloned();
            builder = builder.set_override_option(*key, value)?;
        }

        let environment = env
            .get("APP_ENV")
            .or_else(|| env.get("NODE_ENV"))
            .and_then(|raw| match raw.parse::<Environment>() {
                Ok(environment) => Some(environment),
                Err(e) => {
                    warn!("Ignoring environment variable: {}", e);
                    None
                }
            });
        builder = builder.set_override_option("environment", environment.map(|e| e.to_string()))?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Checks values that would otherwise only fail on first use.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(StorageError::ConfigurationError(
                "JWT_SECRET must be set".to_string(),
            ));
        }
        self.jwt_ttl()?;
        self.tz()?;
        if self.feed_limit == 0 {
            return Err(StorageError::ConfigurationError(
                "feed_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn jwt_ttl(&self) -> Result<Duration> {
        parse_duration(&self.auth.jwt_expires_in)
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
            .map_err(|e| StorageError::ConfigurationError(e.to_string()))
    }

    /// Cookies are marked `Secure` when the site is served over https.
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// The base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Parses lifetimes such as `3600`, `45s`, `30m`, `1h`, `2d` or `1w`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || StorageError::ConfigurationError(format!("invalid duration '{}'", value));

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };
    let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;
    if seconds <= 0 {
        return Err(invalid());
    }
    Duration::try_seconds(seconds).ok_or_else(invalid)
}
