//! Store configuration via `objectstore.toml`
//!
//! A missing file is created with commented defaults on first use. Unknown
//! consistency names are rejected when the file is loaded, not when a store
//! first needs them.

use objectstore_core::{ConsistencyLevel, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed next to the data it configures.
pub const CONFIG_FILE_NAME: &str = "objectstore.toml";

/// Store configuration loaded from `objectstore.toml`.
///
/// # Example
///
/// ```toml
/// default_read_consistency = "ONE"
/// default_write_consistency = "QUORUM"
/// default_query_limit = 1000
/// require_allow_filtering = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Level applied to reads that do not name one.
    #[serde(default = "default_consistency_str")]
    pub default_read_consistency: String,
    /// Level applied to writes and deletes that do not name one.
    #[serde(default = "default_consistency_str")]
    pub default_write_consistency: String,
    /// Row cap for queries and id listings without their own limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_query_limit: Option<usize>,
    /// Reject relations on non-key fields unless the query allows filtering.
    #[serde(default = "default_require_allow_filtering")]
    pub require_allow_filtering: bool,
}

fn default_consistency_str() -> String {
    ConsistencyLevel::One.as_str().to_string()
}

fn default_require_allow_filtering() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_read_consistency: default_consistency_str(),
            default_write_consistency: default_consistency_str(),
            default_query_limit: None,
            require_allow_filtering: default_require_allow_filtering(),
        }
    }
}

impl StoreConfig {
    /// Parse the default read level.
    ///
    /// # Errors
    ///
    /// Returns a config error if the name is not a known level.
    pub fn read_consistency(&self) -> Result<ConsistencyLevel> {
        Self::parse_level("default_read_consistency", &self.default_read_consistency)
    }

    /// Parse the default write level.
    pub fn write_consistency(&self) -> Result<ConsistencyLevel> {
        Self::parse_level("default_write_consistency", &self.default_write_consistency)
    }

    fn parse_level(key: &str, value: &str) -> Result<ConsistencyLevel> {
        value.parse::<ConsistencyLevel>().map_err(|_| {
            Error::Config(format!(
                "Invalid {} '{}' in {}. Expected one of ANY, ONE, TWO, THREE, QUORUM, ALL, \
                 LOCAL_QUORUM, EACH_QUORUM, SERIAL, LOCAL_SERIAL.",
                key, value, CONFIG_FILE_NAME
            ))
        })
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        self.read_consistency()?;
        self.write_consistency()?;
        if self.default_query_limit == Some(0) {
            return Err(Error::Config(format!(
                "default_query_limit in {} must be greater than zero",
                CONFIG_FILE_NAME
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Object store configuration
#
# Consistency levels used when a read or write does not name one.
# One of: ANY, ONE, TWO, THREE, QUORUM, ALL, LOCAL_QUORUM, EACH_QUORUM,
#         SERIAL, LOCAL_SERIAL
default_read_consistency = "ONE"
default_write_consistency = "ONE"

# Row cap for queries and id listings that set no limit (default: unlimited)
# default_query_limit = 1000

# Reject relations on non-key fields unless the query sets allow_filtering
require_allow_filtering = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
