//! # Application Configuration
//!
//! ## Sources (later wins)
//! ```text
//! AppConfig::default()
//!       │
//!       ▼
//! TOML file ─── explicit path, else $UNICLUB_CONFIG, else none
//!       │
//!       ▼
//! UNICLUB_* environment variables
//!       │
//!       ▼
//! validate()
//! ```
//!
//! ## Example file
//! ```toml
//! store_name = "UniClub Quận 1"
//! database_path = "/var/lib/uniclub/uniclub.db"
//!
//! [shipping]
//! free_shipping_threshold = 499000
//! flat_fee = 30000
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use uniclub_core::checkout::ShippingPolicy;
use uniclub_core::{Money, MAX_SEARCH_LEN};

pub const ENV_CONFIG: &str = "UNICLUB_CONFIG";
pub const ENV_STORE_NAME: &str = "UNICLUB_STORE_NAME";
pub const ENV_DATABASE_PATH: &str = "UNICLUB_DATABASE_PATH";
pub const ENV_STORAGE_DIR: &str = "UNICLUB_STORAGE_DIR";
pub const ENV_FREE_SHIPPING_THRESHOLD: &str = "UNICLUB_FREE_SHIPPING_THRESHOLD";
pub const ENV_SHIPPING_FEE: &str = "UNICLUB_SHIPPING_FEE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Config Types
// =============================================================================

/// Shipping fee settings, in đồng.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    pub free_shipping_threshold: i64,
    pub flat_fee: i64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        let policy = ShippingPolicy::default();
        ShippingConfig {
            free_shipping_threshold: policy.free_shipping_threshold.amount(),
            flat_fee: policy.flat_fee.amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store_name: String,
    pub currency_code: String,
    pub currency_symbol: String,
    /// SQLite file. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Directory holding the persisted cart/user/note keys.
    pub storage_dir: Option<PathBuf>,
    pub shipping: ShippingConfig,
    /// Catalog search text is cut to this many characters.
    pub search_max_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_name: "UniClub".to_string(),
            currency_code: "VND".to_string(),
            currency_symbol: "₫".to_string(),
            database_path: None,
            storage_dir: None,
            shipping: ShippingConfig::default(),
            search_max_len: MAX_SEARCH_LEN,
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(store = %config.store_name, "Configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Config file read");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<AppConfig, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `UNICLUB_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_STORE_NAME) {
            self.store_name = name;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_FREE_SHIPPING_THRESHOLD) {
            self.shipping.free_shipping_threshold = parse_amount(ENV_FREE_SHIPPING_THRESHOLD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SHIPPING_FEE) {
            self.shipping.flat_fee = parse_amount(ENV_SHIPPING_FEE, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_name.trim().is_empty() {
            return Err(ConfigError::invalid("store_name", "must not be empty"));
        }
        if self.shipping.free_shipping_threshold < 0 {
            return Err(ConfigError::invalid(
                "shipping.free_shipping_threshold",
                "must not be negative",
            ));
        }
        if self.shipping.flat_fee < 0 {
            return Err(ConfigError::invalid("shipping.flat_fee", "must not be negative"));
        }
        if !(1..=MAX_SEARCH_LEN).contains(&self.search_max_len) {
            return Err(ConfigError::invalid(
                "search_max_len",
                format!("must be between 1 and {MAX_SEARCH_LEN}"),
            ));
        }
        Ok(())
    }

    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_shipping_threshold: Money::from_dong(self.shipping.free_shipping_threshold),
            flat_fee: Money::from_dong(self.shipping.flat_fee),
        }
    }

    /// Configured database file, else `uniclub.db` in the platform data directory.
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join("uniclub.db"))
    }

    /// Configured storage directory, else `storage/` in the platform data directory.
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("storage"))
    }
}

fn parse_amount(key: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::invalid(key, e.to_string()))
}

/// Platform data directory; the working directory when none is known.
fn data_dir() -> PathBuf {
    ProjectDirs::from("vn", "uniclub", "uniclub")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shipping_policy(), ShippingPolicy::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            store_name = "UniClub Quận 1"

            [shipping]
            flat_fee = 25000
            "#,
        )
        .unwrap();

        assert_eq!(config.store_name, "UniClub Quận 1");
        assert_eq!(config.shipping.flat_fee, 25_000);
        assert_eq!(config.shipping.free_shipping_threshold, 499_000);
        assert_eq!(config.currency_code, "VND");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_STORE_NAME, "UniClub Test"),
            (ENV_DATABASE_PATH, "/tmp/uniclub-test.db"),
            (ENV_FREE_SHIPPING_THRESHOLD, " 600000 "),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store_name, "UniClub Test");
        assert_eq!(
            config.resolved_database_path(),
            PathBuf::from("/tmp/uniclub-test.db")
        );
        assert_eq!(config.shipping.free_shipping_threshold, 600_000);
    }

    #[test]
    fn test_bad_env_amount() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == ENV_SHIPPING_FEE).then(|| "free".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.shipping.flat_fee = -1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.search_max_len = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store_name = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
