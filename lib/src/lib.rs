// lib/src/lib.rs

pub mod config;
pub mod errors;
pub mod search;
pub mod storage_engine;
pub mod time_window;

pub use crate::config::{AppConfig, Environment};
pub use crate::errors::{Result, StorageError};
pub use crate::search::{SearchError, SearchParams, SearchPlan};
pub use crate::storage_engine::{create_storage, StorageConfig, StorageEngine, StorageEngineType};
pub use crate::time_window::{filter_rides_by_time_window, TimeWindow, TimeWindowError};
