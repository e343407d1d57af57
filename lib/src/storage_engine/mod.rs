// lib/src/storage_engine/mod.rs

pub mod config;
pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;
pub mod storage_utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{StorageConfig, StorageEngineType};
pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{open_sled_db, SledStorage};
pub use storage_engine::{
    BookmarkStorageEngine, RideStorageEngine, StorageEngine, UserStorageEngine,
};

use log::info;
use std::sync::Arc;

use crate::errors::Result;

/// Creates the storage engine selected by `config`.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn StorageEngine>> {
    info!("Creating {} storage engine", config.engine_type);
    match config.engine_type {
        StorageEngineType::Sled => {
            let storage = SledStorage::open(&config.data_directory)?;
            Ok(Arc::new(storage))
        }
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
    }
}
