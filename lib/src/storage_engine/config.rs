// lib/src/storage_engine/config.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::config_defaults::default_data_directory;
use crate::errors::StorageError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    Sled,
    #[serde(alias = "in-memory", alias = "memory")]
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageEngineType::Sled),
            "inmemory" | "in-memory" | "memory" => Ok(StorageEngineType::InMemory),
            _ => Err(StorageError::ConfigurationError(format!(
                "Unknown storage engine type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Sled => write!(f, "sled"),
            StorageEngineType::InMemory => write!(f, "inmemory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub engine_type: StorageEngineType,
    /// Directory holding the sled database. Unused by the in-memory engine.
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine_type: StorageEngineType::default(),
            data_directory: default_data_directory(),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        StorageConfig {
            engine_type: StorageEngineType::InMemory,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_names() {
        assert_eq!("Sled".parse::<StorageEngineType>().unwrap(), StorageEngineType::Sled);
        assert_eq!("in-memory".parse::<StorageEngineType>().unwrap(), StorageEngineType::InMemory);
        assert!("rocksdb".parse::<StorageEngineType>().is_err());
        assert_eq!(StorageEngineType::InMemory.to_string(), "inmemory");
    }
}
