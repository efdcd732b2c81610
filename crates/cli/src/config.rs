//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPSTATE_DATA_DIR` - Directory holding the persisted slots
//!   (default: `./data`)

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopstate CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file backend stores its slots in.
    pub data_dir: PathBuf,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPSTATE_DATA_DIR` is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = get_env_or_default("SHOPSTATE_DATA_DIR", "./data");
        if data_dir.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPSTATE_DATA_DIR".to_owned(),
                "must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("SHOPSTATE_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }
}
